//! Command: deploy modules.
use anyhow::Result;

use super::{CommandSetup, finish_batch};
use crate::cli::{DeployOpts, GlobalOpts, ModuleOpts};
use crate::exec::Executor;
use crate::logging::Logger;

/// Deploy one module, then sweep dead links.
///
/// # Errors
///
/// Returns an error if the module is missing, its manifest tree is invalid,
/// or a link conflicts.
pub fn run(
    global: &GlobalOpts,
    opts: &ModuleOpts,
    log: &Logger,
    executor: &dyn Executor,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    log.stage(&format!("Deploying {}", opts.module));
    setup.deploy_module(&opts.module, opts.deploy, log, executor)?;
    setup.sweep(log)?;
    Ok(())
}

/// Deploy every module.  Failures are counted, not fatal.
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
    let totals =
        setup.for_each_module(log, |name| setup.deploy_module(name, opts, log, executor))?;
    setup.sweep(log)?;
    finish_batch(log, &totals);
    Ok(())
}
