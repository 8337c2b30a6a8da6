//! Command: clone a module and deploy it.
use anyhow::{Result, bail};

use super::CommandSetup;
use crate::cli::{CloneOpts, GlobalOpts};
use crate::config::project::is_valid_module_name;
use crate::error::ConfigError;
use crate::exec::Executor;
use crate::logging::Logger;
use crate::vcs;

/// Module name for `opts`: `--name` if given, else derived from the URL.
fn module_name(opts: &CloneOpts) -> Result<String> {
    let name = match &opts.name {
        Some(name) => name.clone(),
        None => match vcs::module_name_from_url(&opts.url) {
            Some(name) => name,
            None => bail!("cannot derive a module name from '{}', pass --name", opts.url),
        },
    };
    if !is_valid_module_name(&name) {
        bail!("invalid module name '{name}'");
    }
    Ok(name)
}

/// Clone `opts.url` into the registry, deploy it, then sweep dead links.
///
/// # Errors
///
/// Returns an error if the module already exists, git fails, or the new
/// checkout cannot be deployed.
pub fn run(
    global: &GlobalOpts,
    opts: &CloneOpts,
    log: &Logger,
    executor: &dyn Executor,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let name = module_name(opts)?;
    let dest = setup.project.module_dir(&name);
    if dest.symlink_metadata().is_ok() {
        return Err(ConfigError::ModuleExists(name).into());
    }

    log.stage(&format!("Cloning {name}"));
    vcs::clone(executor, log, &opts.url, &dest, opts.branch.as_deref())?;
    log.info(&format!("cloned {} into {}", opts.url, dest.display()));

    log.stage(&format!("Deploying {name}"));
    setup.deploy_module(&name, opts.deploy, log, executor)?;
    setup.sweep(log)?;
    Ok(())
}
