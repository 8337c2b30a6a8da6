// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project with an initialized
// `.modman` registry and a fluent builder for modules, so each integration
// test can set up an isolated tree without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use modman_cli::cli::GlobalOpts;
use modman_cli::config::Project;
use modman_cli::deploy::{DeployStats, Deployer, LinkMode};
use modman_cli::error::DeployError;
use modman_cli::exec::SystemExecutor;
use modman_cli::logging::{Log, ModuleStatus};

/// A [`Log`] that keeps messages in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct RecordingLog {
    messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingLog {
    fn push(&self, level: &'static str, msg: &str) {
        self.messages
            .lock()
            .expect("log mutex")
            .push((level, msg.to_string()));
    }

    /// Messages logged at `level`.
    pub fn at(&self, level: &str) -> Vec<String> {
        self.messages
            .lock()
            .expect("log mutex")
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record_module(&self, name: &str, status: ModuleStatus, _message: Option<&str>) {
        self.push("module", &format!("{name}: {status:?}"));
    }
}

/// An isolated project backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding the project.
    pub dir: tempfile::TempDir,
    /// The project discovered from `dir`.
    pub project: Project,
}

impl IntegrationTestContext {
    /// Create a project with an empty registry.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let project = Project::init(dir.path(), None).expect("init registry");
        Self { dir, project }
    }

    /// Project root (canonical).
    pub fn root(&self) -> &Path {
        &self.project.root
    }

    /// Global options pointing the commands at this project.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            root: Some(self.dir.path().to_path_buf()),
        }
    }

    /// Create module `name` with the given manifest; returns the manifest path.
    pub fn module(&self, name: &str, manifest: &str) -> PathBuf {
        let dir = self.project.module_dir(name);
        std::fs::create_dir_all(&dir).expect("create module dir");
        let path = dir.join("modman");
        std::fs::write(&path, manifest).expect("write manifest");
        path
    }

    /// Write `content` to `rel` under the project root, creating parents.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Deploy module `name` with a fresh recording log.
    pub fn deploy(&self, name: &str, force: bool) -> Result<DeployStats, DeployError> {
        self.deploy_with(name, force, LinkMode::Symlink, &RecordingLog::default())
    }

    /// Deploy module `name` with explicit options.
    pub fn deploy_with(
        &self,
        name: &str,
        force: bool,
        mode: LinkMode,
        log: &RecordingLog,
    ) -> Result<DeployStats, DeployError> {
        let ctx = self.project.context(force, mode);
        let manifest = self.project.module_dir(name).join("modman");
        Deployer::new(&ctx, log, &SystemExecutor).deploy(&manifest)
    }

    /// Referent of the symlink at `rel`.
    pub fn link(&self, rel: &str) -> PathBuf {
        std::fs::read_link(self.root().join(rel)).expect("read link")
    }

    /// Whether anything (including a dangling link) exists at `rel`.
    pub fn present(&self, rel: &str) -> bool {
        self.root().join(rel).symlink_metadata().is_ok()
    }
}
