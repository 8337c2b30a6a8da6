//! Filesystem query abstraction for dependency injection.
//!
//! Glob expansion only needs to list directories and test for existence, so
//! it goes through [`FileSystemOps`] and can be unit-tested against an
//! in-memory listing.  Production code uses [`SystemFileSystemOps`].

use anyhow::{Context as _, Result};
use std::path::Path;

/// Abstraction over the filesystem queries used by glob expansion.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists (following symlinks).
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory (following symlinks).
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns the names of the immediate children of `path`, unsorted.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>> {
        std::fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .map(|entry| {
                entry
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .with_context(|| format!("reading entry in {}", path.display()))
            })
            .collect()
    }
}

/// In-memory [`FileSystemOps`] for unit tests.
///
/// Register files and directories with the builder methods; parent
/// directories are created implicitly.
///
/// ```ignore
/// let fs = MockFileSystemOps::new()
///     .with_file("/m/etc/a.xml")
///     .with_dir("/m/design");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    dirs: std::collections::BTreeMap<std::path::PathBuf, std::collections::BTreeSet<String>>,
    files: std::collections::BTreeSet<std::path::PathBuf>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a regular file and all of its ancestors.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        self.register_parents(&path);
        self.files.insert(path);
        self
    }

    /// Register a directory and all of its ancestors.
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        self.register_parents(&path);
        self.dirs.entry(path).or_default();
        self
    }

    fn register_parents(&mut self, path: &Path) {
        let mut child = path;
        while let Some(parent) = child.parent() {
            if let Some(name) = child.file_name() {
                self.dirs
                    .entry(parent.to_path_buf())
                    .or_default()
                    .insert(name.to_string_lossy().into_owned());
            }
            child = parent;
        }
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path) || self.dirs.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains_key(path)
    }

    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>> {
        self.dirs.get(path).map_or_else(
            || anyhow::bail!("not a directory: {}", path.display()),
            |names| Ok(names.iter().rev().cloned().collect()),
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn system_lists_directory_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let mut names = SystemFileSystemOps.read_dir_names(dir.path()).unwrap();
        names.sort();
        assert_eq!(names, ["a.txt", "sub"]);
    }

    #[test]
    fn system_read_dir_on_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "").unwrap();
        assert!(SystemFileSystemOps.read_dir_names(&file).is_err());
    }

    #[test]
    fn mock_registers_parents() {
        let fs = MockFileSystemOps::new().with_file("/m/etc/a.xml");
        assert!(fs.is_dir(Path::new("/m/etc")));
        assert!(fs.is_dir(Path::new("/m")));
        assert!(fs.exists(Path::new("/m/etc/a.xml")));
        assert!(!fs.is_dir(Path::new("/m/etc/a.xml")));
        assert_eq!(fs.read_dir_names(Path::new("/m")).unwrap(), ["etc"]);
    }
}
