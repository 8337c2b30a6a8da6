//! `@shell` hook execution.
use std::path::Path;

use crate::exec::Executor;
use crate::logging::Log;

/// Environment variable holding the project root.
pub const PROJECT_ENV: &str = "PROJECT";

/// Environment variable holding the module directory.
pub const MODULE_ENV: &str = "MODULE";

/// Run `command` through `sh -c` in `module_dir`, waiting for it to finish.
///
/// Output is forwarded to the log.  A hook that cannot be spawned or exits
/// non-zero is reported as a warning; the caller decides whether to go on.
/// Returns `true` when the hook succeeded.
pub fn run(
    executor: &dyn Executor,
    log: &dyn Log,
    project_root: &Path,
    module_dir: &Path,
    command: &str,
) -> bool {
    log.debug(&format!("running hook in {}: {command}", module_dir.display()));
    let args = ["-c".to_string(), command.to_string()];
    let env = [
        (
            PROJECT_ENV.to_string(),
            project_root.to_string_lossy().into_owned(),
        ),
        (
            MODULE_ENV.to_string(),
            module_dir.to_string_lossy().into_owned(),
        ),
    ];

    let result = match executor.run_unchecked_in(module_dir, "sh", &args, &env) {
        Ok(result) => result,
        Err(e) => {
            log.warn(&format!("hook failed to start: {command}: {e:#}"));
            return false;
        }
    };

    for line in result.stdout.lines().filter(|l| !l.trim().is_empty()) {
        log.info(line);
    }
    for line in result.stderr.lines().filter(|l| !l.trim().is_empty()) {
        log.warn(line);
    }

    if !result.success {
        let code = result
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        log.warn(&format!("hook exited with {code}: {command}"));
    }
    result.success
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::{ExecResult, MockExecutor, SystemExecutor};
    use crate::logging::RecordingLog;

    #[test]
    fn passes_shell_command_and_environment() {
        let mut executor = MockExecutor::new();
        executor
            .expect_run_unchecked_in()
            .withf(|dir, program, args, env| {
                dir == Path::new("/p/.modman/m")
                    && program == "sh"
                    && args == ["-c".to_string(), "echo hi".to_string()]
                    && env.contains(&("PROJECT".to_string(), "/p".to_string()))
                    && env.contains(&("MODULE".to_string(), "/p/.modman/m".to_string()))
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(ExecResult {
                    stdout: "hi\n".to_string(),
                    success: true,
                    code: Some(0),
                    ..ExecResult::default()
                })
            });
        let log = RecordingLog::default();

        let ok = run(
            &executor,
            &log,
            Path::new("/p"),
            Path::new("/p/.modman/m"),
            "echo hi",
        );
        assert!(ok);
        assert!(log.at("info").contains(&"hi".to_string()));
    }

    #[test]
    fn non_zero_exit_warns() {
        let mut executor = MockExecutor::new();
        executor.expect_run_unchecked_in().returning(|_, _, _, _| {
            Ok(ExecResult {
                stderr: "boom\n".to_string(),
                success: false,
                code: Some(2),
                ..ExecResult::default()
            })
        });
        let log = RecordingLog::default();

        assert!(!run(&executor, &log, Path::new("/p"), Path::new("/m"), "false"));
        let warnings = log.at("warn");
        assert!(warnings.contains(&"boom".to_string()));
        assert!(warnings.iter().any(|w| w == "hook exited with 2: false"));
    }

    #[test]
    fn spawn_failure_warns() {
        let mut executor = MockExecutor::new();
        executor
            .expect_run_unchecked_in()
            .returning(|_, _, _, _| Err(anyhow::anyhow!("no sh")));
        let log = RecordingLog::default();

        assert!(!run(&executor, &log, Path::new("/p"), Path::new("/m"), "x"));
        assert!(log.at("warn")[0].contains("no sh"));
    }

    #[test]
    fn real_shell_sees_environment() {
        let dir = tempfile::tempdir().unwrap();
        let log = RecordingLog::default();
        let ok = run(
            &SystemExecutor,
            &log,
            Path::new("/project"),
            dir.path(),
            "echo \"$PROJECT\"",
        );
        assert!(ok);
        assert_eq!(log.at("info"), ["/project"]);
    }
}
