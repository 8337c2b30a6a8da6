//! Manifest-driven link deployment.
//!
//! A deployment runs in two phases.  [`Plan::build`] parses the manifest and
//! every manifest it imports, validating targets and detecting import
//! cycles, without touching the project.  The [`Deployer`] then walks the
//! plan in file order: link directives are resolved ([`paths`]), expanded
//! ([`glob`]) and reconciled with what is on disk
//! ([`resources::link`](crate::resources::link)); shell directives run
//! through [`hooks`].
pub mod glob;
pub mod hooks;
pub mod paths;
pub mod sweep;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::manifest::{self, Directive, MANIFEST_FILE, Manifest};
use crate::error::DeployError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::resources::{Resolution, Resource as _};
use crate::resources::helpers::fs::{is_symlink, remove_existing};
use crate::resources::link::{self, LinkResource};
use paths::Target;

/// What a deployed link is made of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkMode {
    /// Relative symbolic links.
    #[default]
    Symlink,
    /// Hard links; directory sources are mirrored as real directories.
    Copy,
}

/// Immutable state shared by every manifest of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    /// Directory all targets are relative to.
    pub project_root: PathBuf,
    /// The `.modman` registry directory.
    pub registry: PathBuf,
    /// Replace real files and directories occupying a destination.
    pub force: bool,
    /// Link flavour.
    pub mode: LinkMode,
}

/// Counters reported after a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployStats {
    /// Links created where nothing existed.
    pub created: usize,
    /// Links that were already correct.
    pub unchanged: usize,
    /// Stale links (or forced conflicts) replaced.
    pub replaced: usize,
    /// Link directives whose source did not exist.
    pub missing: usize,
    /// Shell hooks run.
    pub hooks_run: usize,
    /// Shell hooks that failed.
    pub hooks_failed: usize,
}

impl DeployStats {
    /// Number of destinations that were written.
    #[must_use]
    pub const fn changed(&self) -> usize {
        self.created + self.replaced
    }

    /// Add `other`'s counters to these.
    pub const fn merge(&mut self, other: &Self) {
        self.created += other.created;
        self.unchanged += other.unchanged;
        self.replaced += other.replaced;
        self.missing += other.missing;
        self.hooks_run += other.hooks_run;
        self.hooks_failed += other.hooks_failed;
    }
}

impl fmt::Display for DeployStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} replaced, {} unchanged",
            self.created, self.replaced, self.unchanged
        )?;
        if self.missing > 0 {
            write!(f, ", {} missing", self.missing)?;
        }
        if self.hooks_run > 0 {
            write!(f, ", {} hooks", self.hooks_run)?;
            if self.hooks_failed > 0 {
                write!(f, " ({} failed)", self.hooks_failed)?;
            }
        }
        Ok(())
    }
}

/// A link directive with its target validated.
#[derive(Debug, Clone)]
struct LinkStep {
    line: usize,
    text: String,
    source: String,
    target_text: String,
    target: Target,
}

#[derive(Debug, Clone)]
enum Step {
    Link(LinkStep),
    Import(Box<Plan>),
    Shell(String),
}

/// A manifest and, recursively, everything it imports, ready to execute.
#[derive(Debug, Clone)]
pub struct Plan {
    manifest: PathBuf,
    module_dir: PathBuf,
    steps: Vec<Step>,
}

impl Plan {
    /// Parse the manifest at `path` and all of its imports.
    ///
    /// # Errors
    ///
    /// Returns the first parse error, unreadable or missing import, invalid
    /// target or import cycle found anywhere in the tree.
    pub fn build(path: &Path) -> Result<Self, DeployError> {
        Self::build_in_chain(path, &mut Vec::new())
    }

    fn build_in_chain(path: &Path, chain: &mut Vec<PathBuf>) -> Result<Self, DeployError> {
        let key = dunce::canonicalize(path).unwrap_or_else(|_| paths::normalize(path));
        if chain.contains(&key) {
            let cycle: Vec<String> = chain
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect();
            return Err(DeployError::Cycle {
                chain: cycle.join(" -> "),
            });
        }

        let manifest = manifest::load(path)?;
        chain.push(key);
        let plan = Self::from_manifest(&manifest, chain);
        chain.pop();
        plan
    }

    fn from_manifest(manifest: &Manifest, chain: &mut Vec<PathBuf>) -> Result<Self, DeployError> {
        let module_dir = manifest.module_dir().to_path_buf();
        let mut steps = Vec::with_capacity(manifest.entries.len());

        for entry in &manifest.entries {
            let step = match &entry.directive {
                Directive::Link { source, target } => {
                    let parsed =
                        Target::parse(target).ok_or_else(|| DeployError::InvalidTarget {
                            target: target.clone(),
                            reason: "escapes the project root",
                            manifest: manifest.path.clone(),
                            line: entry.line,
                        })?;
                    Step::Link(LinkStep {
                        line: entry.line,
                        text: entry.text.clone(),
                        source: source.clone(),
                        target_text: target.clone(),
                        target: parsed,
                    })
                }
                Directive::Import(rel) => {
                    let base = paths::join_relative(&module_dir, rel);
                    let import = if base.is_file() {
                        base
                    } else {
                        base.join(MANIFEST_FILE)
                    };
                    if !import.is_file() {
                        return Err(DeployError::ImportNotFound {
                            import,
                            manifest: manifest.path.clone(),
                            line: entry.line,
                        });
                    }
                    Step::Import(Box::new(Self::build_in_chain(&import, chain)?))
                }
                Directive::Shell(command) => Step::Shell(command.clone()),
            };
            steps.push(step);
        }

        Ok(Self {
            manifest: manifest.path.clone(),
            module_dir,
            steps,
        })
    }
}

/// Executes deployment plans against one project.
pub struct Deployer<'a> {
    ctx: &'a DeploymentContext,
    log: &'a dyn Log,
    executor: &'a dyn Executor,
    fs_ops: &'a dyn FileSystemOps,
}

impl fmt::Debug for Deployer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deployer")
            .field("ctx", self.ctx)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .field("fs_ops", &self.fs_ops)
            .finish()
    }
}

impl<'a> Deployer<'a> {
    /// Create a deployer that reads the real filesystem.
    #[must_use]
    pub fn new(ctx: &'a DeploymentContext, log: &'a dyn Log, executor: &'a dyn Executor) -> Self {
        Self {
            ctx,
            log,
            executor,
            fs_ops: &SystemFileSystemOps,
        }
    }

    /// Use `fs_ops` for source lookups and glob expansion.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: &'a dyn FileSystemOps) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    /// Deploy the manifest at `manifest` and everything it imports.
    ///
    /// Nothing is written unless the whole import tree parses.  The first
    /// conflict or link failure stops the deployment; links created before
    /// it stay in place, and running again after fixing the cause picks up
    /// where it stopped.
    ///
    /// # Errors
    ///
    /// Returns the [`DeployError`] that aborted the manifest.
    pub fn deploy(&self, manifest: &Path) -> Result<DeployStats, DeployError> {
        let plan = Plan::build(manifest)?;
        let mut stats = DeployStats::default();
        self.execute(&plan, &mut stats)?;
        Ok(stats)
    }

    fn execute(&self, plan: &Plan, stats: &mut DeployStats) -> Result<(), DeployError> {
        for step in &plan.steps {
            match step {
                Step::Link(link) => self.link(plan, link, stats)?,
                Step::Import(inner) => {
                    self.log
                        .debug(&format!("importing {}", inner.manifest.display()));
                    self.execute(inner, stats)?;
                }
                Step::Shell(command) => {
                    stats.hooks_run += 1;
                    let ok = hooks::run(
                        self.executor,
                        self.log,
                        &self.ctx.project_root,
                        &plan.module_dir,
                        command,
                    );
                    if !ok {
                        stats.hooks_failed += 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn link(
        &self,
        plan: &Plan,
        step: &LinkStep,
        stats: &mut DeployStats,
    ) -> Result<(), DeployError> {
        let literal = paths::join_relative(&plan.module_dir, &step.source);
        if self.fs_ops.exists(&literal) {
            let dest_rel = self.literal_destination(&literal, &step.target);
            return self.place(&literal, &dest_rel, plan, step, stats);
        }

        if glob::has_magic(&step.source) {
            let matches = glob::expand(self.fs_ops, &plan.module_dir, &step.source).map_err(
                |e| DeployError::Glob {
                    pattern: step.source.clone(),
                    reason: format!("{e:#}"),
                },
            )?;
            if !matches.is_empty() {
                self.log.debug(&format!(
                    "{} matched {} entries",
                    step.source,
                    matches.len()
                ));
                for source in &matches {
                    let Some(name) = source.file_name() else {
                        continue;
                    };
                    self.place(source, &step.target.rel.join(name), plan, step, stats)?;
                }
                return Ok(());
            }
        }

        self.missing(&literal, &step.target, stats)
    }

    /// A file source lands inside the target when the target is written as
    /// a container or is an existing real directory.
    fn literal_destination(&self, source: &Path, target: &Target) -> PathBuf {
        if self.fs_ops.is_dir(source) {
            return target.rel.clone();
        }
        let dest = self.ctx.project_root.join(&target.rel);
        let into_dir = target.is_container || dest.symlink_metadata().is_ok_and(|m| m.is_dir());
        match source.file_name() {
            Some(name) if into_dir => target.rel.join(name),
            _ => target.rel.clone(),
        }
    }

    /// Where a link for `source` would sit if it had been deployed.  A
    /// container target holds it under the source's basename, as
    /// [`Self::literal_destination`] places files.
    fn stale_candidate(&self, source: &Path, target: &Target) -> Option<PathBuf> {
        let dest = self.ctx.project_root.join(&target.rel);
        let into_dir = target.is_container || dest.symlink_metadata().is_ok_and(|m| m.is_dir());
        match source.file_name() {
            Some(name) if into_dir => Some(dest.join(name)),
            _ if target.is_root() => None,
            _ => Some(dest),
        }
    }

    fn missing(
        &self,
        source: &Path,
        target: &Target,
        stats: &mut DeployStats,
    ) -> Result<(), DeployError> {
        stats.missing += 1;
        match self.stale_candidate(source, target) {
            Some(dest) if is_symlink(&dest) => {
                remove_existing(&dest).map_err(|e| DeployError::LinkCreation {
                    dest: dest.clone(),
                    reason: format!("{e:#}"),
                })?;
                self.log.warn(&format!(
                    "removed stale link {} ({} does not exist)",
                    dest.display(),
                    source.display()
                ));
            }
            _ => self
                .log
                .warn(&format!("source does not exist: {}", source.display())),
        }
        Ok(())
    }

    fn place(
        &self,
        source: &Path,
        dest_rel: &Path,
        plan: &Plan,
        step: &LinkStep,
        stats: &mut DeployStats,
    ) -> Result<(), DeployError> {
        if dest_rel.as_os_str().is_empty() {
            return Err(DeployError::InvalidTarget {
                target: step.target_text.clone(),
                reason: "would replace the project root",
                manifest: plan.manifest.clone(),
                line: step.line,
            });
        }
        let resolved = paths::resolve(&self.ctx.project_root, source, dest_rel);
        let resources = match self.ctx.mode {
            LinkMode::Symlink => vec![LinkResource::symlink(
                resolved.source,
                resolved.dest,
                resolved.referent,
            )],
            LinkMode::Copy if self.fs_ops.is_dir(&resolved.source) => {
                link::mirror(&resolved.source, &resolved.dest).map_err(|e| {
                    DeployError::LinkCreation {
                        dest: resolved.dest.clone(),
                        reason: format!("{e:#}"),
                    }
                })?
            }
            LinkMode::Copy => vec![LinkResource::hard_link(resolved.source, resolved.dest)],
        };

        for resource in &resources {
            self.reconcile(resource, plan, step, stats)?;
        }
        Ok(())
    }

    fn reconcile(
        &self,
        resource: &LinkResource,
        plan: &Plan,
        step: &LinkStep,
        stats: &mut DeployStats,
    ) -> Result<(), DeployError> {
        let creation_error = |e: anyhow::Error| DeployError::LinkCreation {
            dest: resource.dest.clone(),
            reason: format!("{e:#}"),
        };

        let resolution = resource.resolution(self.ctx.force).map_err(creation_error)?;
        match resolution {
            Resolution::Keep => {
                stats.unchanged += 1;
                self.log.debug(&format!("ok: {}", resource.description()));
            }
            Resolution::Create => {
                resource.apply().map_err(creation_error)?;
                stats.created += 1;
                self.log.info(&format!("linked {}", resource.description()));
            }
            Resolution::Replace => {
                resource.apply().map_err(creation_error)?;
                stats.replaced += 1;
                self.log.info(&format!("replaced {}", resource.description()));
            }
            Resolution::Conflict(reason) => {
                self.log.debug(&format!(
                    "{} {reason}",
                    resource.dest.display()
                ));
                return Err(DeployError::Conflict {
                    dest: resource.dest.clone(),
                    manifest: plan.manifest.clone(),
                    line: step.line,
                    content: step.text.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::exec::{ExecResult, MockExecutor};
    use crate::logging::RecordingLog;

    struct Project {
        _dir: tempfile::TempDir,
        ctx: DeploymentContext,
    }

    impl Project {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dunce::canonicalize(dir.path()).unwrap();
            let registry = root.join(".modman");
            std::fs::create_dir_all(&registry).unwrap();
            Self {
                _dir: dir,
                ctx: DeploymentContext {
                    project_root: root,
                    registry,
                    force: false,
                    mode: LinkMode::Symlink,
                },
            }
        }

        fn root(&self) -> &Path {
            &self.ctx.project_root
        }

        fn module(&self, name: &str, manifest: &str) -> PathBuf {
            let dir = self.ctx.registry.join(name);
            std::fs::create_dir_all(&dir).unwrap();
            let path = dir.join(MANIFEST_FILE);
            std::fs::write(&path, manifest).unwrap();
            path
        }

        fn file(&self, rel: &str, content: &str) {
            let path = self.root().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn deploy(&self, manifest: &Path) -> Result<DeployStats, DeployError> {
            let log = RecordingLog::default();
            let executor = MockExecutor::new();
            Deployer::new(&self.ctx, &log, &executor).deploy(manifest)
        }
    }

    fn link_of(path: &Path) -> PathBuf {
        std::fs::read_link(path).unwrap()
    }

    #[test]
    fn directory_source_maps_to_stripped_container() {
        let p = Project::new();
        let manifest = p.module("My_Module", "code app/code/local/My/Module/\n");
        p.file(".modman/My_Module/code/Model.php", "<?php");

        let stats = p.deploy(&manifest).unwrap();

        assert_eq!(stats.created, 1);
        let dest = p.root().join("app/code/local/My/Module");
        assert_eq!(
            link_of(&dest),
            PathBuf::from("../../../../.modman/My_Module/code")
        );
        assert!(dest.join("Model.php").is_file());
    }

    #[test]
    fn file_source_into_container_uses_basename() {
        let p = Project::new();
        let manifest = p.module("m", "etc/config.xml app/etc/modules/\n");
        p.file(".modman/m/etc/config.xml", "<config/>");

        p.deploy(&manifest).unwrap();

        let dest = p.root().join("app/etc/modules/config.xml");
        assert_eq!(
            link_of(&dest),
            PathBuf::from("../../../.modman/m/etc/config.xml")
        );
    }

    #[test]
    fn second_deploy_changes_nothing() {
        let p = Project::new();
        let manifest = p.module("m", "a.txt a.txt\nlib lib/vendor/m\n");
        p.file(".modman/m/a.txt", "a");
        p.file(".modman/m/lib/x.php", "x");

        let first = p.deploy(&manifest).unwrap();
        let second = p.deploy(&manifest).unwrap();

        assert_eq!(first.created, 2);
        assert_eq!(second.changed(), 0);
        assert_eq!(second.unchanged, 2);
    }

    #[test]
    fn stale_link_is_replaced() {
        let p = Project::new();
        let manifest = p.module("m", "a.txt a.txt\n");
        p.file(".modman/m/a.txt", "a");
        std::os::unix::fs::symlink("elsewhere", p.root().join("a.txt")).unwrap();

        let stats = p.deploy(&manifest).unwrap();

        assert_eq!(stats.replaced, 1);
        assert_eq!(link_of(&p.root().join("a.txt")), PathBuf::from(".modman/m/a.txt"));
    }

    #[test]
    fn conflict_without_force_leaves_file() {
        let p = Project::new();
        let manifest = p.module("m", "a.txt a.txt\n");
        p.file(".modman/m/a.txt", "module");
        p.file("a.txt", "mine");

        let err = p.deploy(&manifest).unwrap_err();

        match err {
            DeployError::Conflict { line, content, .. } => {
                assert_eq!(line, 1);
                assert_eq!(content, "a.txt a.txt");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(p.root().join("a.txt")).unwrap(), "mine");
    }

    #[test]
    fn force_replaces_real_directory() {
        let mut p = Project::new();
        p.ctx.force = true;
        let manifest = p.module("m", "skin skin/m\n");
        p.file(".modman/m/skin/a.css", "a");
        p.file("skin/m/old.css", "old");

        let stats = p.deploy(&manifest).unwrap();

        assert_eq!(stats.replaced, 1);
        assert!(is_symlink(&p.root().join("skin/m")));
        assert!(p.root().join("skin/m/a.css").exists());
        assert!(!p.root().join("skin/m/old.css").exists());
    }

    #[test]
    fn glob_creates_one_link_per_match() {
        let p = Project::new();
        let manifest = p.module("m", "design/*.xml app/design/layout/\n");
        p.file(".modman/m/design/a.xml", "");
        p.file(".modman/m/design/b.xml", "");
        p.file(".modman/m/design/c.txt", "");

        let stats = p.deploy(&manifest).unwrap();

        assert_eq!(stats.created, 2);
        assert_eq!(
            link_of(&p.root().join("app/design/layout/a.xml")),
            PathBuf::from("../../../.modman/m/design/a.xml")
        );
        assert!(is_symlink(&p.root().join("app/design/layout/b.xml")));
        assert!(!p.root().join("app/design/layout/c.txt").exists());
    }

    #[test]
    fn missing_source_removes_stale_link_and_warns() {
        let p = Project::new();
        let manifest = p.module("m", "gone.txt gone.txt\n");
        std::os::unix::fs::symlink(".modman/m/gone.txt", p.root().join("gone.txt")).unwrap();
        let log = RecordingLog::default();
        let executor = MockExecutor::new();

        let stats = Deployer::new(&p.ctx, &log, &executor)
            .deploy(&manifest)
            .unwrap();

        assert_eq!(stats.missing, 1);
        assert!(!is_symlink(&p.root().join("gone.txt")));
        assert!(log.at("warn")[0].starts_with("removed stale link"));
    }

    #[test]
    fn missing_source_into_root_checks_basename_only() {
        let p = Project::new();
        let manifest = p.module("m", "gone.txt ./\nother/ ./\n");
        std::os::unix::fs::symlink(".modman/m/gone.txt", p.root().join("gone.txt")).unwrap();
        std::os::unix::fs::symlink("elsewhere", p.root().join("keep")).unwrap();
        let log = RecordingLog::default();
        let executor = MockExecutor::new();

        let stats = Deployer::new(&p.ctx, &log, &executor)
            .deploy(&manifest)
            .unwrap();

        assert_eq!(stats.missing, 2);
        assert!(!is_symlink(&p.root().join("gone.txt")));
        assert!(is_symlink(&p.root().join("keep")));
        assert!(p.root().join(".modman").is_dir());
    }

    #[test]
    fn missing_import_creates_nothing() {
        let p = Project::new();
        let manifest = p.module(
            "m",
            "a.txt a.txt\n@import modules/Fooman_Speedster\n",
        );
        p.file(".modman/m/a.txt", "a");

        let err = p.deploy(&manifest).unwrap_err();

        assert!(matches!(err, DeployError::ImportNotFound { line: 2, .. }));
        assert!(p.root().join("a.txt").symlink_metadata().is_err());
    }

    #[test]
    fn import_cycle_is_detected() {
        let p = Project::new();
        let a = p.module("a", "@import ../b\n");
        p.module("b", "@import ../a\n");

        let err = p.deploy(&a).unwrap_err();

        let DeployError::Cycle { chain } = err else {
            panic!("expected cycle, got {err:?}");
        };
        assert_eq!(chain.matches(" -> ").count(), 2);
    }

    #[test]
    fn diamond_import_is_allowed() {
        let p = Project::new();
        let top = p.module("top", "@import ../left\n@import ../right\n");
        p.module("left", "@import ../shared\n");
        p.module("right", "@import ../shared\n");
        p.module("shared", "lib.php lib.php\n");
        p.file(".modman/shared/lib.php", "");

        let stats = p.deploy(&top).unwrap();

        assert_eq!(stats.created, 1);
        assert_eq!(stats.unchanged, 1);
    }

    #[test]
    fn imported_sources_resolve_against_imported_manifest() {
        let p = Project::new();
        let top = p.module("top", "@import sub\n");
        p.file(".modman/top/sub/modman", "x.js js/x.js\n");
        p.file(".modman/top/sub/x.js", "");

        p.deploy(&top).unwrap();

        assert_eq!(
            link_of(&p.root().join("js/x.js")),
            PathBuf::from("../.modman/top/sub/x.js")
        );
    }

    #[test]
    fn escaping_target_is_rejected_before_changes() {
        let p = Project::new();
        let manifest = p.module("m", "a.txt a.txt\nb.txt ../../etc/passwd\n");
        p.file(".modman/m/a.txt", "a");

        let err = p.deploy(&manifest).unwrap_err();

        assert!(matches!(err, DeployError::InvalidTarget { line: 2, .. }));
        assert!(p.root().join("a.txt").symlink_metadata().is_err());
    }

    #[test]
    fn hook_sees_earlier_links_and_failure_does_not_stop() {
        let p = Project::new();
        let manifest = p.module("m", "a.txt a.txt\n@shell exit 1\nb.txt b.txt\n");
        p.file(".modman/m/a.txt", "a");
        p.file(".modman/m/b.txt", "b");

        let a_link = p.root().join("a.txt");
        let b_link = p.root().join("b.txt");
        let module_dir = p.ctx.registry.join("m");
        let mut executor = MockExecutor::new();
        executor
            .expect_run_unchecked_in()
            .withf(move |dir, program, args, _| {
                dir == module_dir && program == "sh" && args[1] == "exit 1"
            })
            .times(1)
            .returning(move |_, _, _, _| {
                assert!(is_symlink(&a_link), "hook ran before the link above it");
                assert!(!is_symlink(&b_link), "hook ran after the link below it");
                Ok(ExecResult {
                    success: false,
                    code: Some(1),
                    ..ExecResult::default()
                })
            });
        let log = RecordingLog::default();

        let stats = Deployer::new(&p.ctx, &log, &executor)
            .deploy(&manifest)
            .unwrap();

        assert_eq!(stats.hooks_run, 1);
        assert_eq!(stats.hooks_failed, 1);
        assert_eq!(stats.created, 2);
    }

    #[test]
    fn copy_mode_hard_links_files() {
        let mut p = Project::new();
        p.ctx.mode = LinkMode::Copy;
        let manifest = p.module("m", "lib lib/m\n");
        p.file(".modman/m/lib/a.php", "a");
        p.file(".modman/m/lib/sub/b.php", "b");

        let first = p.deploy(&manifest).unwrap();
        let second = p.deploy(&manifest).unwrap();

        assert_eq!(first.created, 4);
        assert_eq!(second.changed(), 0);
        let dest = p.root().join("lib/m/sub/b.php");
        assert!(!is_symlink(&dest));
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "b");
    }

    #[test]
    fn stats_display() {
        let stats = DeployStats {
            created: 2,
            unchanged: 1,
            missing: 1,
            hooks_run: 2,
            hooks_failed: 1,
            ..DeployStats::default()
        };
        insta::assert_snapshot!(stats.to_string(), @"2 created, 0 replaced, 1 unchanged, 1 missing, 2 hooks (1 failed)");
    }
}
