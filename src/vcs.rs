//! Version-control operations on module checkouts.
//!
//! Only exit status matters: the VCS programs do the real work.
use anyhow::Result;
use std::path::Path;

use crate::error::ExternalToolError;
use crate::exec::Executor;
use crate::logging::Log;

/// A supported version control system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcs {
    /// Git (`.git` directory or file).
    Git,
    /// Mercurial (`.hg`).
    Mercurial,
    /// Subversion (`.svn`).
    Subversion,
}

impl Vcs {
    /// Detect the VCS of the checkout at `dir` from its metadata entry.
    #[must_use]
    pub fn detect(dir: &Path) -> Option<Self> {
        [
            (".git", Self::Git),
            (".hg", Self::Mercurial),
            (".svn", Self::Subversion),
        ]
        .into_iter()
        .find(|(meta, _)| dir.join(meta).exists())
        .map(|(_, vcs)| vcs)
    }

    /// Program implementing this VCS.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Mercurial => "hg",
            Self::Subversion => "svn",
        }
    }

    /// Argument lists that bring a checkout up to date, run in order.
    fn update_commands(self) -> Vec<Vec<String>> {
        let owned = |args: &[&str]| args.iter().map(ToString::to_string).collect::<Vec<_>>();
        match self {
            Self::Git => vec![
                owned(&["pull"]),
                owned(&["submodule", "update", "--init", "--recursive"]),
            ],
            Self::Mercurial => vec![owned(&["pull", "-u"])],
            Self::Subversion => vec![owned(&["update"])],
        }
    }
}

fn require(executor: &dyn Executor, program: &str) -> Result<()> {
    if executor.which(program) {
        Ok(())
    } else {
        Err(ExternalToolError::NotInstalled(program.to_string()).into())
    }
}

fn log_output(log: &dyn Log, output: &str) {
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        log.debug(line);
    }
}

/// Update the checkout at `dir` with whatever VCS it uses.
///
/// # Errors
///
/// Returns [`ExternalToolError`] when no VCS is detected, its program is not
/// installed or a command exits non-zero.
pub fn update(executor: &dyn Executor, log: &dyn Log, dir: &Path) -> Result<Vcs> {
    let vcs = Vcs::detect(dir).ok_or_else(|| ExternalToolError::UnknownVcs(dir.to_path_buf()))?;
    let program = vcs.program();
    require(executor, program)?;

    for args in vcs.update_commands() {
        log.debug(&format!("{program} {}", args.join(" ")));
        let result = executor.run_in(dir, program, &args)?;
        log_output(log, &result.stdout);
    }
    Ok(vcs)
}

/// Clone `url` into `dest` with git, checking out `branch` if given, then
/// initialize submodules.
///
/// # Errors
///
/// Returns [`ExternalToolError`] if git is missing or fails.
pub fn clone(
    executor: &dyn Executor,
    log: &dyn Log,
    url: &str,
    dest: &Path,
    branch: Option<&str>,
) -> Result<()> {
    require(executor, "git")?;
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));

    let mut args = vec!["clone".to_string()];
    if let Some(branch) = branch {
        args.extend(["--branch".to_string(), branch.to_string()]);
    }
    args.extend([url.to_string(), dest.to_string_lossy().into_owned()]);
    log.debug(&format!("git {}", args.join(" ")));
    let result = executor.run_in(parent, "git", &args)?;
    log_output(log, &result.stdout);

    if dest.join(".gitmodules").is_file() {
        let args: Vec<String> = ["submodule", "update", "--init", "--recursive"]
            .iter()
            .map(ToString::to_string)
            .collect();
        executor.run_in(dest, "git", &args)?;
    }
    Ok(())
}

/// Derive a module name from a repository URL: its last path segment
/// without a `.git` suffix.
///
/// # Examples
///
/// ```
/// use modman_cli::vcs::module_name_from_url;
///
/// assert_eq!(
///     module_name_from_url("https://github.com/colinmollenhour/Fooman_Speedster.git").as_deref(),
///     Some("Fooman_Speedster"),
/// );
/// assert_eq!(module_name_from_url("git@host:org/lib/").as_deref(), Some("lib"));
/// ```
#[must_use]
pub fn module_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty()).then(|| name.to_string())
}
