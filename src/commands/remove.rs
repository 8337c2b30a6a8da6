//! Command: delete a module checkout.
use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::{GlobalOpts, RemoveOpts};
use crate::config::project::is_valid_module_name;
use crate::error::ConfigError;
use crate::logging::Logger;

/// Delete the module's directory, then sweep the links it leaves dangling.
///
/// # Errors
///
/// Returns an error if the module does not exist or cannot be deleted.
pub fn run(global: &GlobalOpts, opts: &RemoveOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let dir = setup.project.module_dir(&opts.module);
    if !is_valid_module_name(&opts.module) || !dir.is_dir() {
        return Err(ConfigError::ModuleNotFound(opts.module.clone()).into());
    }

    log.stage(&format!("Removing {}", opts.module));
    std::fs::remove_dir_all(&dir).with_context(|| format!("removing {}", dir.display()))?;
    log.info(&format!("removed {}", dir.display()));

    let removed = setup.sweep(log)?;
    log.info(&format!("{} link(s) removed", removed.len()));
    Ok(())
}
