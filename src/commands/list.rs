//! Command: list checked-out modules.
use anyhow::Result;
use std::io::Write as _;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::Project;
use crate::config::manifest::MANIFEST_FILE;
use crate::logging::Logger;

/// Print the registry's modules, one per line.
///
/// # Errors
///
/// Returns an error if no registry is found or it cannot be listed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let listing = render(&setup.project)?;
    if listing.is_empty() {
        log.info("no modules checked out");
    }
    std::io::stdout().lock().write_all(listing.as_bytes())?;
    Ok(())
}

/// One line per module; modules without a manifest are marked.
fn render(project: &Project) -> Result<String> {
    let mut out = String::new();
    for name in project.modules()? {
        out.push_str(&name);
        if !project.module_dir(&name).join(MANIFEST_FILE).is_file() {
            out.push_str(" (no manifest)");
        }
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn marks_modules_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::init(dir.path(), None).unwrap();
        for name in ["Fooman_Speedster", "Aoe_Profiler", "empty"] {
            std::fs::create_dir(project.module_dir(name)).unwrap();
        }
        std::fs::write(project.module_dir("Fooman_Speedster").join("modman"), "").unwrap();
        std::fs::write(project.module_dir("Aoe_Profiler").join("modman"), "").unwrap();

        insta::assert_snapshot!(render(&project).unwrap(), @r"
        Aoe_Profiler
        Fooman_Speedster
        empty (no manifest)
        ");
    }

    #[test]
    fn empty_registry_renders_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::init(dir.path(), None).unwrap();
        assert_eq!(render(&project).unwrap(), "");
    }
}
