//! Deployed link resource.
//!
//! A [`LinkResource`] is one destination the engine owns: a relative
//! symlink, a hard link (copy mode) or a real directory created while
//! mirroring a directory source in copy mode.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, remove_existing};
use super::{Resource, ResourceState};

/// How a destination is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Symbolic link storing a relative referent.
    Symlink,
    /// Hard link to a regular file.
    HardLink,
    /// Real directory (copy mode, directory sources).
    Directory,
}

/// A link destination that can be checked and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResource {
    /// Absolute path of the module file or directory.
    pub source: PathBuf,
    /// Absolute destination path.
    pub dest: PathBuf,
    /// Relative path stored in the symlink; unused for other kinds.
    pub referent: PathBuf,
    /// What to create at `dest`.
    pub kind: LinkKind,
}

impl LinkResource {
    /// A symlink at `dest` storing `referent`, which resolves to `source`.
    #[must_use]
    pub const fn symlink(source: PathBuf, dest: PathBuf, referent: PathBuf) -> Self {
        Self {
            source,
            dest,
            referent,
            kind: LinkKind::Symlink,
        }
    }

    /// A hard link at `dest` sharing `source`'s inode.
    #[must_use]
    pub fn hard_link(source: PathBuf, dest: PathBuf) -> Self {
        Self {
            referent: source.clone(),
            source,
            dest,
            kind: LinkKind::HardLink,
        }
    }

    fn directory(source: PathBuf, dest: PathBuf) -> Self {
        Self {
            referent: source.clone(),
            source,
            dest,
            kind: LinkKind::Directory,
        }
    }
}

impl Resource for LinkResource {
    fn description(&self) -> String {
        match self.kind {
            LinkKind::Symlink => {
                format!("{} -> {}", self.dest.display(), self.referent.display())
            }
            LinkKind::HardLink => {
                format!("{} => {}", self.dest.display(), self.source.display())
            }
            LinkKind::Directory => format!("{}/", self.dest.display()),
        }
    }

    fn current_state(&self) -> Result<ResourceState> {
        let meta = match self.dest.symlink_metadata() {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ResourceState::Missing);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("inspect {}", self.dest.display()));
            }
        };

        if meta.file_type().is_symlink() {
            let existing = std::fs::read_link(&self.dest)
                .with_context(|| format!("read link {}", self.dest.display()))?;
            if self.kind == LinkKind::Symlink && existing == self.referent {
                return Ok(ResourceState::Correct);
            }
            return Ok(ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            });
        }

        let shares_inode =
            self.kind == LinkKind::HardLink && meta.is_file() && same_file(&self.source, &meta)?;
        let state = match self.kind {
            LinkKind::Directory if meta.is_dir() => ResourceState::Correct,
            LinkKind::HardLink if shares_inode => ResourceState::Correct,
            _ if meta.is_dir() => ResourceState::Invalid {
                reason: "is a directory".to_string(),
            },
            _ => ResourceState::Invalid {
                reason: "is a regular file".to_string(),
            },
        };
        Ok(state)
    }

    fn apply(&self) -> Result<()> {
        ensure_parent_dir(&self.dest)?;
        remove_existing(&self.dest)?;

        match self.kind {
            LinkKind::Symlink => create_symlink(&self.referent, &self.dest)?,
            LinkKind::HardLink => std::fs::hard_link(&self.source, &self.dest).with_context(|| {
                format!(
                    "creating hard link {} => {}",
                    self.dest.display(),
                    self.source.display()
                )
            })?,
            LinkKind::Directory => std::fs::create_dir(&self.dest)
                .with_context(|| format!("creating directory {}", self.dest.display()))?,
        }
        Ok(())
    }
}

/// Resources that mirror the directory `source` at `dest` in copy mode: the
/// directories themselves, then every file as a hard link.  Entries are in
/// walk order (parents before children, names sorted).
///
/// # Errors
///
/// Returns an error if the source tree cannot be walked.
pub fn mirror(source: &Path, dest: &Path) -> Result<Vec<LinkResource>> {
    let mut resources = Vec::new();
    for entry in walkdir::WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("walking {}", source.display()))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("{} is outside {}", entry.path().display(), source.display()))?;
        let target = if rel.as_os_str().is_empty() {
            dest.to_path_buf()
        } else {
            dest.join(rel)
        };
        let path = entry.path().to_path_buf();
        if entry.file_type().is_dir() {
            resources.push(LinkResource::directory(path, target));
        } else {
            resources.push(LinkResource::hard_link(path, target));
        }
    }
    Ok(resources)
}

#[cfg(unix)]
fn same_file(source: &Path, dest_meta: &std::fs::Metadata) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;
    let src = std::fs::metadata(source).with_context(|| format!("inspect {}", source.display()))?;
    Ok(src.dev() == dest_meta.dev() && src.ino() == dest_meta.ino())
}

#[cfg(not(unix))]
fn same_file(_source: &Path, _dest_meta: &std::fs::Metadata) -> Result<bool> {
    Ok(false)
}

/// Create a symlink at `link` storing `referent`.
fn create_symlink(referent: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    std::os::unix::fs::symlink(referent, link).with_context(|| {
        format!(
            "creating symlink {} -> {}",
            link.display(),
            referent.display()
        )
    })?;

    #[cfg(windows)]
    {
        let resolved = link.parent().map_or_else(|| referent.to_path_buf(), |p| p.join(referent));
        let result = if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(referent, link)
        } else {
            std::os::windows::fs::symlink_file(referent, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                referent.display()
            )
        })?;
    }

    Ok(())
}
