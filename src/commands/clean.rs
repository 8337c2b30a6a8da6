//! Command: remove dead links.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::logging::Logger;

/// Remove every dead link under the project root.
///
/// # Errors
///
/// Returns an error if no registry is found or a link cannot be removed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let removed = setup.sweep(log)?;
    log.info(&format!("{} link(s) removed", removed.len()));
    Ok(())
}
