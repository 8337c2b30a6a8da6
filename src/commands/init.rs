//! Command: create a module registry.
use anyhow::Result;

use super::resolve_start;
use crate::cli::{GlobalOpts, InitOpts};
use crate::config::Project;
use crate::logging::Logger;

/// Create `.modman` in the start directory, recording the base directory
/// when one is given.
///
/// # Errors
///
/// Returns an error if the directory already has a registry or it cannot be
/// created.
pub fn run(global: &GlobalOpts, opts: &InitOpts, log: &Logger) -> Result<()> {
    let start = resolve_start(global)?;
    let project = Project::init(&start, opts.basedir.as_deref())?;
    for warning in &project.warnings {
        log.warn(warning);
    }
    log.info(&format!("initialized {}", project.registry.display()));
    log.info(&format!("links will be created under {}", project.root.display()));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::project::BASEDIR_FILE;

    fn global(root: &std::path::Path) -> GlobalOpts {
        GlobalOpts {
            root: Some(root.to_path_buf()),
        }
    }

    #[test]
    fn creates_registry_with_basedir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("htdocs")).unwrap();
        let log = Logger::new("test");
        let opts = InitOpts {
            basedir: Some("htdocs".to_string()),
        };

        run(&global(dir.path()), &opts, &log).unwrap();

        let basedir = std::fs::read_to_string(dir.path().join(".modman").join(BASEDIR_FILE)).unwrap();
        assert_eq!(basedir.trim(), "htdocs");
    }

    #[test]
    fn refuses_existing_registry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".modman")).unwrap();
        let log = Logger::new("test");
        let err = run(&global(dir.path()), &InitOpts { basedir: None }, &log).unwrap_err();
        assert!(err.to_string().contains("already"), "{err}");
    }
}
