//! Domain-specific error types for the modman engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`DeployError`]) while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ModmanError
//! ├── Config(ConfigError)          : registry, module and manifest lookup
//! ├── Deploy(DeployError)          : parsing, conflicts, imports, link creation
//! └── External(ExternalToolError)  : VCS commands
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the modman engine.
#[derive(Error, Debug)]
pub enum ModmanError {
    /// Project, registry or module lookup failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A manifest could not be deployed.
    #[error("Deployment error: {0}")]
    Deploy(#[from] DeployError),

    /// An external tool exited unsuccessfully.
    #[error("External tool error: {0}")]
    External(#[from] ExternalToolError),
}

/// Errors that arise while locating the project, registry and modules.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No ancestor of the start directory contains a `.modman` registry.
    #[error("module registry not found in {} or any parent (run `modman init`)", .start.display())]
    RegistryNotFound {
        /// Directory the upward search started from.
        start: PathBuf,
    },

    /// The requested module has no directory in the registry.
    #[error("module '{0}' does not exist")]
    ModuleNotFound(String),

    /// The module directory exists but contains no manifest.
    #[error("module '{module}' has no manifest at {}", .path.display())]
    ManifestMissing {
        /// Module name.
        module: String,
        /// Expected manifest path.
        path: PathBuf,
    },

    /// A module with this name is already checked out.
    #[error("module '{0}' already exists")]
    ModuleExists(String),

    /// The registry already exists where `init` was asked to create it.
    #[error("already initialized: {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// An I/O error occurred while reading registry state.
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that abort the deployment of a manifest.
///
/// Every variant is fatal for the manifest it occurs in and propagates up
/// through the import chain.  Missing sources and stale links are not errors;
/// they are reported as warnings by the engine.
#[derive(Error, Debug)]
pub enum DeployError {
    /// A manifest line did not yield two non-empty fields.
    #[error("invalid input in {}:{line}: {content}", .manifest.display())]
    Parse {
        /// Manifest containing the bad line.
        manifest: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Raw line text.
        content: String,
    },

    /// The manifest file itself could not be read.
    #[error("cannot read manifest {}: {source}", .manifest.display())]
    ManifestUnreadable {
        /// Manifest path.
        manifest: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An `@import` names a directory without a readable manifest.
    #[error("failed modman import {} (not found) at {}:{line}", .import.display(), .manifest.display())]
    ImportNotFound {
        /// Resolved path of the manifest that should have been imported.
        import: PathBuf,
        /// Importing manifest.
        manifest: PathBuf,
        /// 1-based line number of the `@import` directive.
        line: usize,
    },

    /// Following imports would recurse forever.
    #[error("import cycle detected: {chain}")]
    Cycle {
        /// Human-readable chain, e.g. `a/modman -> b/modman -> a/modman`.
        chain: String,
    },

    /// A real file or directory occupies the destination and force is off.
    #[error("CONFLICT: {} already exists and is not a symlink ({}:{line}: {content})", .dest.display(), .manifest.display())]
    Conflict {
        /// Occupied destination.
        dest: PathBuf,
        /// Manifest containing the directive.
        manifest: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Raw line text.
        content: String,
    },

    /// A link target resolves outside the project root, or would replace
    /// the root itself.
    #[error("invalid target '{target}': {reason} ({}:{line})", .manifest.display())]
    InvalidTarget {
        /// Target as written in the manifest.
        target: String,
        /// What is wrong with it.
        reason: &'static str,
        /// Manifest containing the directive.
        manifest: PathBuf,
        /// 1-based line number.
        line: usize,
    },

    /// The filesystem refused to create (or clear the way for) a link.
    #[error("unable to create link {}: {reason}", .dest.display())]
    LinkCreation {
        /// Destination path.
        dest: PathBuf,
        /// Full error chain from the filesystem operation.
        reason: String,
    },

    /// Listing a directory during glob expansion failed.
    #[error("unable to expand '{pattern}': {reason}")]
    Glob {
        /// Source pattern from the manifest.
        pattern: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Errors raised by external programs whose failure is fatal.
#[derive(Error, Debug)]
pub enum ExternalToolError {
    /// No supported VCS metadata directory was found in the module.
    #[error("no supported version control found in {}", .0.display())]
    UnknownVcs(PathBuf),

    /// The VCS program is not installed.
    #[error("'{0}' is not installed or not on PATH")]
    NotInstalled(String),

    /// A command exited with a non-zero status.
    #[error("'{command}' failed (exit {code}): {stderr}")]
    Failed {
        /// Command line that was run.
        command: String,
        /// Exit code, `-1` when killed by a signal.
        code: i32,
        /// Captured standard error.
        stderr: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn parse_error_references_line() {
        let e = DeployError::Parse {
            manifest: PathBuf::from("/p/.modman/foo/modman"),
            line: 4,
            content: "lonely".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "invalid input in /p/.modman/foo/modman:4: lonely"
        );
    }

    #[test]
    fn conflict_error_display() {
        let e = DeployError::Conflict {
            dest: PathBuf::from("/p/app/etc"),
            manifest: PathBuf::from("/p/.modman/foo/modman"),
            line: 2,
            content: "etc app/etc".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("CONFLICT: /p/app/etc"));
        assert!(msg.contains("modman:2: etc app/etc"));
    }

    #[test]
    fn import_not_found_display() {
        let e = DeployError::ImportNotFound {
            import: PathBuf::from("/p/.modman/foo/sub/modman"),
            manifest: PathBuf::from("/p/.modman/foo/modman"),
            line: 1,
        };
        assert!(e.to_string().contains("(not found)"));
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/p/.modman"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn external_failure_display() {
        let e = ExternalToolError::Failed {
            command: "git pull".to_string(),
            code: 1,
            stderr: "not a repository".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "'git pull' failed (exit 1): not a repository"
        );
    }

    #[test]
    fn modman_error_from_sub_errors() {
        let e: ModmanError = ConfigError::ModuleNotFound("x".to_string()).into();
        assert!(e.to_string().contains("Configuration error"));
        let e: ModmanError = DeployError::Cycle {
            chain: "a -> a".to_string(),
        }
        .into();
        assert!(e.to_string().contains("Deployment error"));
        let e: ModmanError = ExternalToolError::NotInstalled("svn".to_string()).into();
        assert!(e.to_string().contains("External tool error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ModmanError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<DeployError>();
        assert_send_sync::<ExternalToolError>();
    }

    #[test]
    fn deploy_error_converts_to_anyhow() {
        let e = DeployError::Glob {
            pattern: "*.xml".to_string(),
            reason: "denied".to_string(),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
