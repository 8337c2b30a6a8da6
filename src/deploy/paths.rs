//! Lexical path resolution for deployed links.
//!
//! Everything here works on path text only.  The relative referent of a link
//! must be computable before the destination's parent directories exist, so
//! the filesystem is never consulted.
use std::path::{Component, Path, PathBuf};

/// A link destination relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Normalized path below the project root; empty for the root itself.
    pub rel: PathBuf,
    /// `true` when the manifest wrote the target with a trailing `/`, and
    /// always for the project root.
    pub is_container: bool,
}

impl Target {
    /// Parse a manifest target.
    ///
    /// Empty and `.` segments are dropped and `..` segments are folded.  A
    /// leading `/` is ignored: targets are always relative to the project
    /// root.  A target naming the root itself (`./`, `.`) is a container.
    /// Returns `None` when the target is empty or climbs above the project
    /// root.
    ///
    /// # Examples
    ///
    /// ```
    /// use modman_cli::deploy::paths::Target;
    /// use std::path::PathBuf;
    ///
    /// let t = Target::parse("app/code/local/My/Module/").unwrap();
    /// assert_eq!(t.rel, PathBuf::from("app/code/local/My/Module"));
    /// assert!(t.is_container);
    ///
    /// let root = Target::parse("./").unwrap();
    /// assert!(root.is_root() && root.is_container);
    ///
    /// assert!(Target::parse("../outside").is_none());
    /// ```
    #[must_use]
    pub fn parse(target: &str) -> Option<Self> {
        if target.is_empty() {
            return None;
        }
        let mut segments: Vec<&str> = Vec::new();
        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop()?;
                }
                s => segments.push(s),
            }
        }
        Some(Self {
            is_container: segments.is_empty() || target.ends_with('/'),
            rel: segments.iter().collect(),
        })
    }

    /// Whether the target is the project root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.rel.as_os_str().is_empty()
    }
}

/// Fully resolved paths for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Absolute path of the module file or directory being linked.
    pub source: PathBuf,
    /// Absolute destination.
    pub dest: PathBuf,
    /// Relative path stored in the symlink.
    pub referent: PathBuf,
}

/// Resolve `source` (absolute) and `dest_rel` against `project_root`.
#[must_use]
pub fn resolve(project_root: &Path, source: &Path, dest_rel: &Path) -> ResolvedLink {
    let source = normalize(source);
    ResolvedLink {
        dest: project_root.join(dest_rel),
        referent: link_referent(project_root, &source, dest_rel),
        source,
    }
}

/// `../` once for every directory segment of `dest_rel`.
///
/// # Examples
///
/// ```
/// use modman_cli::deploy::paths::relative_prefix;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(relative_prefix(Path::new("app/etc/local.xml")), PathBuf::from("../.."));
/// assert_eq!(relative_prefix(Path::new("index.php")), PathBuf::new());
/// ```
#[must_use]
pub fn relative_prefix(dest_rel: &Path) -> PathBuf {
    let depth = dest_rel.components().count().saturating_sub(1);
    std::iter::repeat_n(Component::ParentDir, depth).collect()
}

/// The symlink content for a link at `project_root/dest_rel` pointing at
/// `source`: the relative prefix followed by `source` relative to the
/// project root.
#[must_use]
pub fn link_referent(project_root: &Path, source: &Path, dest_rel: &Path) -> PathBuf {
    relative_prefix(dest_rel).join(relative_path(&normalize(project_root), &normalize(source)))
}

/// Join `rel` onto `base`, treating a leading `/` in `rel` as relative.
#[must_use]
pub fn join_relative(base: &Path, rel: &str) -> PathBuf {
    normalize(&base.join(rel.trim_start_matches('/')))
}

/// Lexically normalize `path`: drop `.` segments and fold `..` segments.
///
/// `..` at the root is discarded; a leading `..` on a relative path is kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            c => out.push(c),
        }
    }
    out.iter().collect()
}

/// Path of `to` relative to the directory `from`.  Both must be normalized
/// and either both absolute or both relative.
///
/// # Examples
///
/// ```
/// use modman_cli::deploy::paths::relative_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     relative_path(Path::new("/srv/shop/public"), Path::new("/srv/shop/.modman/foo/code")),
///     PathBuf::from("../.modman/foo/code"),
/// );
/// ```
#[must_use]
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from.len().saturating_sub(common);
    let mut rel: PathBuf = std::iter::repeat_n(Component::ParentDir, ups).collect();
    for component in to.iter().skip(common) {
        rel.push(component);
    }
    if rel.as_os_str().is_empty() {
        rel.push(Component::CurDir);
    }
    rel
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn target_strips_trailing_separator() {
        let t = Target::parse("app/code/local/My/Module/").unwrap();
        assert_eq!(t.rel, PathBuf::from("app/code/local/My/Module"));
        assert!(t.is_container);

        let t = Target::parse("app/etc/local.xml").unwrap();
        assert!(!t.is_container);
    }

    #[test]
    fn target_folds_dots() {
        let t = Target::parse("./app//etc/../design/").unwrap();
        assert_eq!(t.rel, PathBuf::from("app/design"));
    }

    #[test]
    fn target_leading_slash_is_relative() {
        let t = Target::parse("/lib/Foo").unwrap();
        assert_eq!(t.rel, PathBuf::from("lib/Foo"));
    }

    #[test]
    fn target_rejects_escape_and_empty() {
        assert!(Target::parse("../x").is_none());
        assert!(Target::parse("app/../../x").is_none());
        assert!(Target::parse("./..").is_none());
        assert!(Target::parse("").is_none());
    }

    #[test]
    fn target_naming_root_is_a_container() {
        for text in ["./", ".", "/", "app/.."] {
            let t = Target::parse(text).unwrap();
            assert!(t.is_root(), "{text}");
            assert!(t.is_container, "{text}");
            assert_eq!(t.rel, PathBuf::new());
        }
        assert!(!Target::parse("app").unwrap().is_root());
    }

    #[test]
    fn prefix_counts_directory_segments() {
        assert_eq!(relative_prefix(Path::new("a")), PathBuf::new());
        assert_eq!(relative_prefix(Path::new("a/b")), PathBuf::from(".."));
        assert_eq!(
            relative_prefix(Path::new("app/code/local/My/Module")),
            PathBuf::from("../../../..")
        );
    }

    #[test]
    fn referent_for_module_in_registry() {
        let referent = link_referent(
            Path::new("/srv/shop"),
            Path::new("/srv/shop/.modman/My_Module/code"),
            Path::new("app/code/local/My/Module"),
        );
        assert_eq!(
            referent,
            PathBuf::from("../../../../.modman/My_Module/code")
        );
    }

    #[test]
    fn referent_with_base_dir_override() {
        let referent = link_referent(
            Path::new("/srv/shop/public"),
            Path::new("/srv/shop/.modman/foo/skin/style.css"),
            Path::new("skin/style.css"),
        );
        assert_eq!(referent, PathBuf::from("../../.modman/foo/skin/style.css"));
    }

    #[test]
    fn referent_at_root_level() {
        let referent = link_referent(
            Path::new("/p"),
            Path::new("/p/.modman/m/index.php"),
            Path::new("index.php"),
        );
        assert_eq!(referent, PathBuf::from(".modman/m/index.php"));
    }

    #[test]
    fn referent_resolves_to_source_from_link_dir() {
        let root = Path::new("/p");
        let source = Path::new("/p/.modman/m/lib/Foo");
        let dest_rel = Path::new("lib/vendor/Foo");
        let link = resolve(root, source, dest_rel);
        let dest_dir = link.dest.parent().unwrap();
        assert_eq!(normalize(&dest_dir.join(&link.referent)), source);
    }

    #[test]
    fn normalize_folds_components() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn join_relative_ignores_leading_slash() {
        assert_eq!(
            join_relative(Path::new("/m"), "/code/../etc"),
            PathBuf::from("/m/etc")
        );
    }

    #[test]
    fn relative_path_same_dir() {
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a/b")),
            PathBuf::from(".")
        );
    }
}
