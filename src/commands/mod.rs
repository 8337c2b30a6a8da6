//! Top-level subcommand orchestration.
pub mod clean;
pub mod clone;
pub mod completions;
pub mod deploy;
pub mod init;
pub mod list;
pub mod remove;
pub mod update;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::cli::{DeployOpts, GlobalOpts};
use crate::config::Project;
use crate::deploy::{DeployStats, Deployer, LinkMode, sweep};
use crate::exec::Executor;
use crate::error::ConfigError;
use crate::logging::{Logger, ModuleStatus};

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// The discovered project.
    pub project: Project,
}

impl CommandSetup {
    /// Locate the project from `--root` (or `MODMAN_ROOT`, or the current
    /// directory) and report any registry warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the start directory cannot be determined or no
    /// registry is found above it.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let start = resolve_start(global)?;
        let project = Project::discover(&start)?;
        for warning in &project.warnings {
            log.warn(warning);
        }
        log.debug(&format!("registry: {}", project.registry.display()));
        log.debug(&format!("project root: {}", project.root.display()));
        Ok(Self { project })
    }

    /// Deploy module `name` with `opts`.
    ///
    /// # Errors
    ///
    /// Returns an error if the module or its manifest is missing, or the
    /// deployment fails.
    pub fn deploy_module(
        &self,
        name: &str,
        opts: DeployOpts,
        log: &Logger,
        executor: &dyn Executor,
    ) -> Result<DeployStats> {
        let manifest = self.project.manifest_path(name)?;
        let mode = if opts.copy {
            LinkMode::Copy
        } else {
            LinkMode::Symlink
        };
        let ctx = self.project.context(opts.force, mode);
        let stats = Deployer::new(&ctx, log, executor).deploy(&manifest)?;
        log.info(&format!("{name}: {stats}"));
        Ok(stats)
    }

    /// Run `action` on every module, recording each outcome for the summary.
    ///
    /// A failing module is logged and counted; the remaining modules still
    /// run.  Modules without a manifest are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only if the registry cannot be listed.
    pub fn for_each_module<F>(&self, log: &Logger, mut action: F) -> Result<DeployStats>
    where
        F: FnMut(&str) -> Result<DeployStats>,
    {
        let mut totals = DeployStats::default();
        for name in self.project.modules()? {
            log.stage(&name);
            match action(&name) {
                Ok(stats) => {
                    totals.merge(&stats);
                    log.record_module(&name, ModuleStatus::Ok, Some(&stats.to_string()));
                }
                Err(e) if matches!(
                    e.downcast_ref::<ConfigError>(),
                    Some(ConfigError::ManifestMissing { .. })
                ) =>
                {
                    log.warn(&format!("{e}"));
                    log.record_module(&name, ModuleStatus::Skipped, Some("no manifest"));
                }
                Err(e) => {
                    log.error(&format!("{name}: {e:#}"));
                    log.record_module(&name, ModuleStatus::Failed, Some(&e.to_string()));
                }
            }
        }
        Ok(totals)
    }

    /// Remove dead links from the project.
    ///
    /// # Errors
    ///
    /// Returns an error if a dead link cannot be removed.
    pub fn sweep(&self, log: &Logger) -> Result<Vec<PathBuf>> {
        log.stage("Removing dead links");
        let removed = sweep::sweep_dead_links(&self.project.root, &self.project.registry, log)
            .context("sweeping dead links")?;
        if removed.is_empty() {
            log.info("no dead links");
        }
        Ok(removed)
    }
}

/// Directory the registry search starts from.
///
/// # Errors
///
/// Returns an error if no `--root` is given and the current directory is
/// unavailable.
pub fn resolve_start(global: &GlobalOpts) -> Result<PathBuf> {
    match &global.root {
        Some(root) => Ok(root.clone()),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}

/// Print the per-module summary of a batch command.  Failures are counted
/// and reported but do not fail the command.
pub fn finish_batch(log: &Logger, totals: &DeployStats) {
    log.info(&format!("total: {totals}"));
    log.print_summary();
    let failed = log.failure_count();
    if failed > 0 {
        log.warn(&format!("{failed} module(s) failed"));
    }
}
