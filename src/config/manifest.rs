//! Manifest (`modman` file) parsing.
use std::path::{Path, PathBuf};

use crate::error::DeployError;

/// File name of a module manifest.
pub const MANIFEST_FILE: &str = "modman";

/// Directive token that splices another manifest into the deployment.
const IMPORT_TOKEN: &str = "@import";

/// Directive token that runs a shell command.
const SHELL_TOKEN: &str = "@shell";

/// One manifest directive.
///
/// # Examples
///
/// ```
/// use modman_cli::config::manifest::{Directive, parse_str};
/// use std::path::Path;
///
/// let entries = parse_str(Path::new("modman"), "code app/code/local/My/Module/\n").unwrap();
/// assert_eq!(
///     entries[0].directive,
///     Directive::Link {
///         source: "code".to_string(),
///         target: "app/code/local/My/Module/".to_string(),
///     }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Link `source` (relative to the manifest) to `target` (relative to the
    /// project root).  Either may end in `/`.
    Link {
        /// Source path or glob pattern.
        source: String,
        /// Destination path.
        target: String,
    },
    /// Deploy the manifest found in this directory, relative to the current
    /// manifest.
    Import(String),
    /// Run this command through `sh -c`.
    Shell(String),
}

/// A directive together with its position in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based line number.
    pub line: usize,
    /// The line as written, trimmed.
    pub text: String,
    /// Parsed directive.
    pub directive: Directive,
}

/// A parsed manifest file.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Absolute path of the manifest file.
    pub path: PathBuf,
    /// Directives in file order.
    pub entries: Vec<Entry>,
}

impl Manifest {
    /// Directory the manifest lives in; sources and imports are relative to it.
    #[must_use]
    pub fn module_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns [`DeployError::ManifestUnreadable`] if the file cannot be read and
/// [`DeployError::Parse`] for the first malformed line.
pub fn load(path: &Path) -> Result<Manifest, DeployError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        DeployError::ManifestUnreadable {
            manifest: path.to_path_buf(),
            source,
        }
    })?;
    let entries = parse_str(path, &content)?;
    Ok(Manifest {
        path: path.to_path_buf(),
        entries,
    })
}

/// Parse manifest content.  `path` is only used in error messages.
///
/// Comment lines (`#`) and blank lines are skipped.  Every other line is
/// split at its first run of whitespace; the remainder keeps any further
/// whitespace, so `@shell` commands are passed through unchanged.
///
/// # Errors
///
/// Returns [`DeployError::Parse`] for the first line that does not contain
/// two non-empty fields.
pub fn parse_str(path: &Path, content: &str) -> Result<Vec<Entry>, DeployError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut entries = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((first, rest)) = trimmed.split_once(char::is_whitespace) else {
            return Err(DeployError::Parse {
                manifest: path.to_path_buf(),
                line: idx + 1,
                content: trimmed.to_string(),
            });
        };
        let rest = rest.trim_start();

        let directive = match first {
            IMPORT_TOKEN => Directive::Import(rest.to_string()),
            SHELL_TOKEN => Directive::Shell(rest.to_string()),
            _ => Directive::Link {
                source: first.to_string(),
                target: rest.to_string(),
            },
        };

        entries.push(Entry {
            line: idx + 1,
            text: trimmed.to_string(),
            directive,
        });
    }

    Ok(entries)
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

    fn parse(content: &str) -> Result<Vec<Entry>, DeployError> {
        parse_str(Path::new("/p/.modman/m/modman"), content)
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let entries = parse("# header\n\n   \n  # indented comment\netc app/etc\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line, 5);
        assert_eq!(entries[0].text, "etc app/etc");
    }

    #[test]
    fn classifies_directives_in_order() {
        let entries =
            parse("@import modules/Sub\ncode app/code/\n@shell echo done\n").unwrap();
        let kinds: Vec<&Directive> = entries.iter().map(|e| &e.directive).collect();
        assert_eq!(
            kinds,
            [
                &Directive::Import("modules/Sub".to_string()),
                &Directive::Link {
                    source: "code".to_string(),
                    target: "app/code/".to_string()
                },
                &Directive::Shell("echo done".to_string()),
            ]
        );
    }

    #[test]
    fn shell_payload_keeps_inner_whitespace() {
        let entries = parse("@shell   cp  -r a\tb  ").unwrap();
        assert_eq!(
            entries[0].directive,
            Directive::Shell("cp  -r a\tb".to_string())
        );
    }

    #[test]
    fn link_separated_by_tabs() {
        let entries = parse("skin/*\t\tskin/frontend/base/default/").unwrap();
        assert_eq!(
            entries[0].directive,
            Directive::Link {
                source: "skin/*".to_string(),
                target: "skin/frontend/base/default/".to_string()
            }
        );
    }

    #[test]
    fn single_field_is_fatal() {
        let err = parse("etc app/etc\nlonely\nmore stuff\n").unwrap_err();
        match err {
            DeployError::Parse { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "lonely");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn bare_import_token_is_fatal() {
        assert!(matches!(
            parse("@import\n"),
            Err(DeployError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn tolerates_bom_and_crlf() {
        let entries = parse("\u{feff}etc app/etc\r\ncode app/code\r\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[1].directive,
            Directive::Link {
                source: "code".to_string(),
                target: "app/code".to_string()
            }
        );
    }

    #[test]
    fn load_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join(MANIFEST_FILE)).unwrap_err();
        assert!(matches!(err, DeployError::ManifestUnreadable { .. }));
    }

    #[test]
    fn module_dir_is_manifest_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "a b\n").unwrap();
        let manifest = load(&path).unwrap();
        assert_eq!(manifest.module_dir(), dir.path());
    }
}
