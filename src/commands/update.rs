//! Command: update module checkouts and redeploy them.
use anyhow::Result;

use super::{CommandSetup, finish_batch};
use crate::cli::{DeployOpts, GlobalOpts, ModuleOpts};
use crate::config::project::is_valid_module_name;
use crate::deploy::DeployStats;
use crate::error::ConfigError;
use crate::exec::Executor;
use crate::logging::Logger;
use crate::vcs;

fn update_module(
    setup: &CommandSetup,
    name: &str,
    opts: DeployOpts,
    log: &Logger,
    executor: &dyn Executor,
) -> Result<DeployStats> {
    let dir = setup.project.module_dir(name);
    if !is_valid_module_name(name) || !dir.is_dir() {
        return Err(ConfigError::ModuleNotFound(name.to_string()).into());
    }
    let vcs = vcs::update(executor, log, &dir)?;
    log.info(&format!("updated {name} with {}", vcs.program()));
    setup.deploy_module(name, opts, log, executor)
}

/// Update one module's checkout, deploy it, then sweep dead links.
///
/// # Errors
///
/// Returns an error if the module is missing, its VCS fails, or the
/// deployment fails.
pub fn run(
    global: &GlobalOpts,
    opts: &ModuleOpts,
    log: &Logger,
    executor: &dyn Executor,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    log.stage(&format!("Updating {}", opts.module));
    update_module(&setup, &opts.module, opts.deploy, log, executor)?;
    setup.sweep(log)?;
    Ok(())
}

/// Update and deploy every module.  Failures are counted, not fatal.
///
/// # Errors
///
/// Returns an error only if the project cannot be set up or swept.
pub fn run_all(
    global: &GlobalOpts,
    opts: DeployOpts,
    log: &Logger,
    executor: &dyn Executor,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let totals = setup.for_each_module(log, |name| {
        update_module(&setup, name, opts, log, executor)
    })?;
    setup.sweep(log)?;
    finish_batch(log, &totals);
    Ok(())
}
