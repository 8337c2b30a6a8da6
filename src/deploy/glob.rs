//! Shell-style glob expansion of manifest sources.
//!
//! Patterns are matched one path component at a time against directory
//! listings obtained through [`FileSystemOps`], so expansion can be tested
//! without touching the disk.  Plain wildcards (`*`, `?`, `[...]`) are
//! compiled with [`glob::Pattern`]; extended groups (`@(a|b)`, `?(..)`,
//! `*(..)`, `+(..)`, `!(..)`) are translated to a [`regex::Regex`].
//!
//! Like the shell, a leading `.` in a file name must be matched literally.
use anyhow::{Context as _, Result, bail};
use regex::Regex;
use std::path::{Path, PathBuf};

use super::paths;
use crate::operations::FileSystemOps;

/// Characters that make a plain component a wildcard pattern.
const WILDCARDS: [char; 3] = ['*', '?', '['];

/// Prefix characters of an extended glob group.
const EXTGLOB_PREFIXES: [char; 5] = ['?', '*', '+', '@', '!'];

/// Returns `true` if `pattern` contains any glob syntax.
///
/// # Examples
///
/// ```
/// use modman_cli::deploy::glob::has_magic;
///
/// assert!(has_magic("skin/*.css"));
/// assert!(has_magic("etc/@(config|system).xml"));
/// assert!(!has_magic("app/code/local"));
/// ```
#[must_use]
pub fn has_magic(pattern: &str) -> bool {
    pattern.contains(WILDCARDS) || has_extglob(pattern)
}

fn has_extglob(component: &str) -> bool {
    component
        .as_bytes()
        .windows(2)
        .any(|w| matches!(w, [p, b'('] if EXTGLOB_PREFIXES.contains(&char::from(*p))))
}

/// Expand `pattern` relative to `base`.
///
/// Returns the matching paths in sorted order, normalized.  Components
/// without glob syntax must exist literally; intermediate matches must be
/// directories.
///
/// # Errors
///
/// Returns an error if a component is not a valid pattern or a directory on
/// the way cannot be listed.
pub fn expand(fs: &dyn FileSystemOps, base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
    let last = components.len().saturating_sub(1);
    let mut candidates = vec![base.to_path_buf()];

    for (idx, component) in components.iter().enumerate() {
        let is_last = idx == last;
        let mut next = Vec::new();

        if has_magic(component) {
            let matcher = ComponentMatcher::new(component)?;
            for dir in &candidates {
                if !fs.is_dir(dir) {
                    continue;
                }
                let mut names = fs.read_dir_names(dir)?;
                names.sort();
                for name in names.iter().filter(|n| matcher.matches(n)) {
                    let path = dir.join(name);
                    if is_last || fs.is_dir(&path) {
                        next.push(path);
                    }
                }
            }
        } else {
            for dir in &candidates {
                let path = paths::normalize(&dir.join(component));
                if (is_last && fs.exists(&path)) || (!is_last && fs.is_dir(&path)) {
                    next.push(path);
                }
            }
        }

        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }

    if components.is_empty() {
        return Ok(Vec::new());
    }
    Ok(candidates.iter().map(|p| paths::normalize(p)).collect())
}

/// Matcher for a single path component.
#[derive(Debug)]
pub struct ComponentMatcher {
    kind: MatcherKind,
    literal_dot: bool,
}

#[derive(Debug)]
enum MatcherKind {
    Wildcard(glob::Pattern),
    Extended {
        include: Regex,
        exclude: Option<Regex>,
    },
}

impl ComponentMatcher {
    /// Compile one component of a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed classes or groups, and for components
    /// with more than one `!(...)` group.
    pub fn new(component: &str) -> Result<Self> {
        let kind = if has_extglob(component) {
            let include = translate(component, Negation::Wildcard)?;
            let exclude = if component.contains("!(") {
                Some(translate(component, Negation::Alternation)?)
            } else {
                None
            };
            MatcherKind::Extended {
                include: compile(&include, component)?,
                exclude: exclude.map(|e| compile(&e, component)).transpose()?,
            }
        } else {
            MatcherKind::Wildcard(
                glob::Pattern::new(component)
                    .with_context(|| format!("invalid glob pattern: {component}"))?,
            )
        };
        Ok(Self {
            kind,
            literal_dot: component.starts_with('.'),
        })
    }

    /// Returns `true` if the file name `name` matches.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        if name.starts_with('.') && !self.literal_dot {
            return false;
        }
        match &self.kind {
            MatcherKind::Wildcard(pattern) => pattern.matches_with(
                name,
                glob::MatchOptions {
                    case_sensitive: true,
                    require_literal_separator: true,
                    require_literal_leading_dot: true,
                },
            ),
            MatcherKind::Extended { include, exclude } => {
                include.is_match(name) && !exclude.as_ref().is_some_and(|e| e.is_match(name))
            }
        }
    }
}

fn compile(source: &str, component: &str) -> Result<Regex> {
    Regex::new(source).with_context(|| format!("invalid extended glob: {component}"))
}

/// How a `!(...)` group is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Negation {
    /// As `.*`, producing the regex that candidate names must match.
    Wildcard,
    /// As the group's alternatives, producing the regex of excluded names.
    Alternation,
}

/// Translate an extended glob component to an anchored regex.
fn translate(component: &str, negation: Negation) -> Result<String> {
    let chars: Vec<char> = component.chars().collect();
    let mut out = String::from("^");
    let mut groups: Vec<char> = Vec::new();
    let mut negations = 0usize;
    let mut i = 0usize;

    while let Some(&c) = chars.get(i) {
        let opens_group = chars.get(i + 1) == Some(&'(') && EXTGLOB_PREFIXES.contains(&c);
        if opens_group {
            if c == '!' {
                negations += 1;
                if negations > 1 || !groups.is_empty() {
                    bail!("only one top-level !(...) group is supported: {component}");
                }
                if negation == Negation::Wildcard {
                    i = skip_group(&chars, i + 2)
                        .with_context(|| format!("unclosed group in {component}"))?;
                    out.push_str(".*");
                    continue;
                }
            }
            groups.push(c);
            out.push_str("(?:");
            i += 2;
            continue;
        }

        match c {
            ')' if !groups.is_empty() => {
                out.push(')');
                match groups.pop() {
                    Some('*') => out.push('*'),
                    Some('+') => out.push('+'),
                    Some('?') => out.push('?'),
                    _ => {}
                }
            }
            '|' if !groups.is_empty() => out.push('|'),
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let (class, next) = translate_class(&chars, i)
                    .with_context(|| format!("unclosed character class in {component}"))?;
                out.push_str(&class);
                i = next;
                continue;
            }
            '\\' => {
                i += 1;
                if let Some(&escaped) = chars.get(i) {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
        i += 1;
    }

    if !groups.is_empty() {
        bail!("unclosed group in {component}");
    }
    out.push('$');
    Ok(out)
}

/// Index just past the `)` closing the group whose body starts at `start`.
fn skip_group(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = start;
    while let Some(&c) = chars.get(i) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Translate a bracket expression starting at `chars[start] == '['`.
///
/// Returns the regex class and the index just past the closing `]`.
fn translate_class(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut out = String::from("[");
    let mut i = start + 1;
    if matches!(chars.get(i), Some('!' | '^')) {
        out.push('^');
        i += 1;
    }
    // A `]` right after the opening bracket is a literal member.
    if chars.get(i) == Some(&']') {
        out.push_str("\\]");
        i += 1;
    }
    while let Some(&c) = chars.get(i) {
        match c {
            ']' => {
                out.push(']');
                return Some((out, i + 1));
            }
            '[' if chars.get(i + 1) == Some(&':') => {
                let end = (i + 2..chars.len()).find(|&j| {
                    chars.get(j) == Some(&':') && chars.get(j + 1) == Some(&']')
                })?;
                out.extend(chars.get(i..end + 2)?);
                i = end + 2;
                continue;
            }
            '\\' | '[' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
        i += 1;
    }
    None
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;

    fn matches(pattern: &str, name: &str) -> bool {
        ComponentMatcher::new(pattern).unwrap().matches(name)
    }

    #[test]
    fn detects_magic() {
        assert!(has_magic("*.xml"));
        assert!(has_magic("file?.txt"));
        assert!(has_magic("[ab].txt"));
        assert!(has_magic("+(a|b)"));
        assert!(has_magic("!(x)"));
        assert!(!has_magic("app/etc/modules/"));
        assert!(!has_magic("a(b)"));
    }

    #[test]
    fn wildcards() {
        assert!(matches("*.xml", "config.xml"));
        assert!(!matches("*.xml", "config.xml.bak"));
        assert!(matches("file?.txt", "file1.txt"));
        assert!(matches("[ab]*", "alpha"));
        assert!(!matches("[!ab]*", "alpha"));
    }

    #[test]
    fn hidden_files_need_literal_dot() {
        assert!(!matches("*", ".htaccess"));
        assert!(matches(".*", ".htaccess"));
        assert!(!matches("@(*)", ".git"));
    }

    #[test]
    fn extended_alternation() {
        assert!(matches("@(config|system).xml", "config.xml"));
        assert!(matches("@(config|system).xml", "system.xml"));
        assert!(!matches("@(config|system).xml", "api.xml"));
    }

    #[test]
    fn extended_quantifiers() {
        assert!(matches("a?(b)c", "ac"));
        assert!(matches("a?(b)c", "abc"));
        assert!(!matches("a?(b)c", "abbc"));
        assert!(matches("a*(b)c", "abbbc"));
        assert!(matches("a+(b)c", "abc"));
        assert!(!matches("a+(b)c", "ac"));
    }

    #[test]
    fn extended_negation() {
        assert!(matches("!(*.bak)", "local.xml"));
        assert!(!matches("!(*.bak)", "local.xml.bak"));
        assert!(matches("foo!(bar)baz", "fooquxbaz"));
        assert!(!matches("foo!(bar)baz", "foobarbaz"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(matches("@(a.b|c+d)", "c+d"));
        assert!(!matches("@(a.b|c+d)", "axb"));
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(ComponentMatcher::new("@(a|b").is_err());
        assert!(ComponentMatcher::new("!(a)!(b)").is_err());
        assert!(ComponentMatcher::new("@(a|[b)").is_err());
    }

    #[test]
    fn posix_class_in_bracket() {
        assert!(matches("@([[:digit:]]).txt", "7.txt"));
        assert!(!matches("@([[:digit:]]).txt", "x.txt"));
    }

    #[test]
    fn expand_last_component_sorted() {
        let fs = MockFileSystemOps::new()
            .with_file("/m/etc/b.xml")
            .with_file("/m/etc/a.xml")
            .with_file("/m/etc/readme.txt");
        let found = expand(&fs, Path::new("/m"), "etc/*.xml").unwrap();
        assert_eq!(
            found,
            [PathBuf::from("/m/etc/a.xml"), PathBuf::from("/m/etc/b.xml")]
        );
    }

    #[test]
    fn expand_intermediate_component() {
        let fs = MockFileSystemOps::new()
            .with_file("/m/design/base/layout.xml")
            .with_file("/m/design/rwd/layout.xml")
            .with_file("/m/design/notes.txt")
            .with_dir("/m/design/empty");
        let found = expand(&fs, Path::new("/m"), "design/*/layout.xml").unwrap();
        assert_eq!(
            found,
            [
                PathBuf::from("/m/design/base/layout.xml"),
                PathBuf::from("/m/design/rwd/layout.xml"),
            ]
        );
    }

    #[test]
    fn expand_matches_directories_at_the_end() {
        let fs = MockFileSystemOps::new()
            .with_dir("/m/lib/Foo")
            .with_file("/m/lib/Bar.php");
        let found = expand(&fs, Path::new("/m"), "lib/*").unwrap();
        assert_eq!(
            found,
            [PathBuf::from("/m/lib/Bar.php"), PathBuf::from("/m/lib/Foo")]
        );
    }

    #[test]
    fn expand_no_match_is_empty() {
        let fs = MockFileSystemOps::new().with_file("/m/etc/a.txt");
        assert!(expand(&fs, Path::new("/m"), "etc/*.xml").unwrap().is_empty());
        assert!(expand(&fs, Path::new("/m"), "missing/*").unwrap().is_empty());
    }

    #[test]
    fn expand_handles_parent_segments() {
        let fs = MockFileSystemOps::new()
            .with_file("/shared/x.js")
            .with_dir("/m");
        let found = expand(&fs, Path::new("/m"), "../shared/*.js").unwrap();
        assert_eq!(found, [PathBuf::from("/shared/x.js")]);
    }

    #[test]
    fn expand_on_real_filesystem() {
        use crate::operations::SystemFileSystemOps;
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("skin")).unwrap();
        std::fs::write(dir.path().join("skin/a.css"), "").unwrap();
        std::fs::write(dir.path().join("skin/.hidden.css"), "").unwrap();
        let found = expand(&SystemFileSystemOps, dir.path(), "skin/*.css").unwrap();
        assert_eq!(found, [paths::normalize(&dir.path().join("skin/a.css"))]);
    }
}
