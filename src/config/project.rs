//! Project discovery: the `.modman` registry and the project root.
use std::path::{Path, PathBuf};

use super::manifest::MANIFEST_FILE;
use crate::deploy::{DeploymentContext, LinkMode, paths};
use crate::error::ConfigError;

/// Name of the registry directory holding module checkouts.
pub const REGISTRY_DIR: &str = ".modman";

/// Optional file inside the registry naming an alternate project root.
pub const BASEDIR_FILE: &str = ".basedir";

/// A discovered project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// The `.modman` directory.
    pub registry: PathBuf,
    /// Directory link targets are relative to: the registry's parent, or the
    /// directory named by `.modman/.basedir`.
    pub root: PathBuf,
    /// Problems found while reading the registry that did not stop discovery.
    pub warnings: Vec<String>,
}

impl Project {
    /// Find the nearest ancestor of `start` (inclusive) containing a
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RegistryNotFound`] if no ancestor has one, and
    /// [`ConfigError::Io`] if `start` or the base dir file cannot be read.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        let start = dunce::canonicalize(start).map_err(|source| ConfigError::Io {
            path: start.to_path_buf(),
            source,
        })?;
        let registry = start
            .ancestors()
            .map(|dir| dir.join(REGISTRY_DIR))
            .find(|candidate| candidate.is_dir())
            .ok_or_else(|| ConfigError::RegistryNotFound {
                start: start.clone(),
            })?;
        Self::from_registry(registry)
    }

    /// Create a registry in `start`, optionally recording a base directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyInitialized`] if `start` already has a
    /// registry, and [`ConfigError::Io`] if it cannot be created.
    pub fn init(start: &Path, basedir: Option<&str>) -> Result<Self, ConfigError> {
        let registry = start.join(REGISTRY_DIR);
        if registry.symlink_metadata().is_ok() {
            return Err(ConfigError::AlreadyInitialized(registry));
        }
        std::fs::create_dir_all(&registry).map_err(|source| ConfigError::Io {
            path: registry.clone(),
            source,
        })?;
        if let Some(basedir) = basedir {
            let file = registry.join(BASEDIR_FILE);
            std::fs::write(&file, format!("{basedir}\n"))
                .map_err(|source| ConfigError::Io { path: file, source })?;
        }
        let registry = dunce::canonicalize(&registry).map_err(|source| ConfigError::Io {
            path: registry.clone(),
            source,
        })?;
        Self::from_registry(registry)
    }

    fn from_registry(registry: PathBuf) -> Result<Self, ConfigError> {
        let parent = registry
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
        let mut warnings = Vec::new();
        let basedir_file = registry.join(BASEDIR_FILE);

        let root = match std::fs::read_to_string(&basedir_file) {
            Ok(content) => {
                let line = content.lines().next().unwrap_or_default().trim();
                if line.is_empty() {
                    parent
                } else {
                    let candidate = paths::normalize(&parent.join(line));
                    if candidate.is_dir() {
                        dunce::canonicalize(&candidate).unwrap_or(candidate)
                    } else {
                        warnings.push(format!(
                            "base directory {} does not exist, using {}",
                            candidate.display(),
                            parent.display()
                        ));
                        parent
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => parent,
            Err(source) => {
                return Err(ConfigError::Io {
                    path: basedir_file,
                    source,
                });
            }
        };

        Ok(Self {
            registry,
            root,
            warnings,
        })
    }

    /// Directory of module `name` (which may not exist).
    #[must_use]
    pub fn module_dir(&self, name: &str) -> PathBuf {
        self.registry.join(name)
    }

    /// Manifest path of module `name`, which must be checked out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ModuleNotFound`] for an unknown or malformed
    /// name and [`ConfigError::ManifestMissing`] when the checkout has no
    /// manifest.
    pub fn manifest_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        if !is_valid_module_name(name) {
            return Err(ConfigError::ModuleNotFound(name.to_string()));
        }
        let dir = self.module_dir(name);
        if !dir.is_dir() {
            return Err(ConfigError::ModuleNotFound(name.to_string()));
        }
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(ConfigError::ManifestMissing {
                module: name.to_string(),
                path,
            });
        }
        Ok(path)
    }

    /// Names of all module directories in the registry, sorted.  Hidden
    /// entries (including `.basedir`) are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the registry cannot be listed.
    pub fn modules(&self) -> Result<Vec<String>, ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: self.registry.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.registry).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') && entry.path().is_dir() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Deployment context for this project.
    #[must_use]
    pub fn context(&self, force: bool, mode: LinkMode) -> DeploymentContext {
        DeploymentContext {
            project_root: self.root.clone(),
            registry: self.registry.clone(),
            force,
            mode,
        }
    }
}

/// A module name is a single, non-hidden path component.
#[must_use]
pub fn is_valid_module_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn canonical_tempdir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dunce::canonicalize(dir.path()).unwrap();
        (dir, path)
    }

    #[test]
    fn discover_walks_up_from_subdirectory() {
        let (_dir, root) = canonical_tempdir();
        std::fs::create_dir_all(root.join(".modman")).unwrap();
        std::fs::create_dir_all(root.join("app/code/local")).unwrap();

        let project = Project::discover(&root.join("app/code/local")).unwrap();

        assert_eq!(project.registry, root.join(".modman"));
        assert_eq!(project.root, root);
        assert!(project.warnings.is_empty());
    }

    #[test]
    fn discover_without_registry_fails() {
        let (_dir, root) = canonical_tempdir();
        let err = Project::discover(&root).unwrap_err();
        // A registry in an ancestor of the temp dir would be found instead.
        if let ConfigError::RegistryNotFound { start } = err {
            assert_eq!(start, root);
        }
    }

    #[test]
    fn basedir_relative_to_registry_parent() {
        let (_dir, root) = canonical_tempdir();
        std::fs::create_dir_all(root.join("public")).unwrap();
        let project = Project::init(&root, Some("public")).unwrap();
        assert_eq!(project.root, root.join("public"));

        let rediscovered = Project::discover(&root.join("public")).unwrap();
        assert_eq!(rediscovered, project);
    }

    #[test]
    fn basedir_absolute() {
        let (_dir, root) = canonical_tempdir();
        let (_other, elsewhere) = canonical_tempdir();
        let project = Project::init(&root, Some(&elsewhere.to_string_lossy())).unwrap();
        assert_eq!(project.root, elsewhere);
    }

    #[test]
    fn missing_basedir_falls_back_with_warning() {
        let (_dir, root) = canonical_tempdir();
        let project = Project::init(&root, Some("nope")).unwrap();
        assert_eq!(project.root, root);
        assert_eq!(project.warnings.len(), 1);
        assert!(project.warnings[0].contains("does not exist"));
    }

    #[test]
    fn init_twice_fails() {
        let (_dir, root) = canonical_tempdir();
        Project::init(&root, None).unwrap();
        assert!(matches!(
            Project::init(&root, None),
            Err(ConfigError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn modules_are_sorted_and_skip_hidden() {
        let (_dir, root) = canonical_tempdir();
        let project = Project::init(&root, Some(".")).unwrap();
        for name in ["b_mod", "a_mod", ".git"] {
            std::fs::create_dir_all(project.module_dir(name)).unwrap();
        }
        assert_eq!(project.modules().unwrap(), ["a_mod", "b_mod"]);
    }

    #[test]
    fn manifest_path_errors() {
        let (_dir, root) = canonical_tempdir();
        let project = Project::init(&root, None).unwrap();
        std::fs::create_dir_all(project.module_dir("empty")).unwrap();

        assert!(matches!(
            project.manifest_path("absent"),
            Err(ConfigError::ModuleNotFound(_))
        ));
        assert!(matches!(
            project.manifest_path("../etc"),
            Err(ConfigError::ModuleNotFound(_))
        ));
        match project.manifest_path("empty") {
            Err(ConfigError::ManifestMissing { module, path }) => {
                assert_eq!(module, "empty");
                assert_eq!(path, project.module_dir("empty").join("modman"));
            }
            other => panic!("expected missing manifest, got {other:?}"),
        }

        std::fs::write(project.module_dir("empty").join("modman"), "").unwrap();
        assert!(project.manifest_path("empty").is_ok());
    }

    #[test]
    fn module_name_validation() {
        assert!(is_valid_module_name("Fooman_Speedster"));
        assert!(!is_valid_module_name(""));
        assert!(!is_valid_module_name(".hidden"));
        assert!(!is_valid_module_name("a/b"));
    }
}
