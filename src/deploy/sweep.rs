//! Dead-link sweeper.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::logging::Log;

/// Remove every symlink under `root` whose referent no longer exists.
///
/// Links are never followed, and `skip` (the registry directory) is not
/// descended into, so module checkouts are left alone.  Returns the removed
/// paths in walk order.
///
/// # Errors
///
/// Returns an error if a dead link cannot be removed.  Unreadable
/// directories are logged and skipped.
pub fn sweep_dead_links(root: &Path, skip: &Path, log: &dyn Log) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != skip);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log.debug(&format!("sweep: skipping unreadable entry: {e}"));
                continue;
            }
        };
        if !entry.path_is_symlink() || entry.path().exists() {
            continue;
        }
        std::fs::remove_file(entry.path())
            .with_context(|| format!("removing dead link {}", entry.path().display()))?;
        log.info(&format!("removed dead link {}", entry.path().display()));
        removed.push(entry.into_path());
    }
    Ok(removed)
}
