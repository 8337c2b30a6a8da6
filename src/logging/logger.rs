//! Structured logger with per-module summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::STAGE_TARGET;
use super::types::{Log, ModuleEntry, ModuleStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with summary collection.
///
/// Messages become [`tracing`] events; the subscriber installed by
/// [`init_subscriber`](super::init_subscriber) prints them and appends them
/// to `$XDG_CACHE_HOME/modman/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    modules: Mutex<Vec<ModuleEntry>>,
    log_file: PathBuf,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            modules: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path.
    #[must_use]
    pub const fn log_path(&self) -> &PathBuf {
        &self.log_file
    }

    /// Return a clone of all recorded module entries.
    #[must_use]
    pub fn module_entries(&self) -> Vec<ModuleEntry> {
        self.modules.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only with `--verbose`, always in the
    /// log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a module result for the summary.
    pub fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.modules.lock() {
            guard.push(ModuleEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed modules.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.modules.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|m| m.status == ModuleStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded modules.
    pub fn print_summary(&self) {
        let modules = self.module_entries();
        if modules.is_empty() {
            return;
        }

        self.stage("Summary");
        for module in &modules {
            let (icon, color) = match module.status {
                ModuleStatus::Ok => ("✓", "\x1b[32m"),
                ModuleStatus::Skipped => ("○", "\x1b[33m"),
                ModuleStatus::Failed => ("✗", "\x1b[31m"),
            };
            let suffix = module
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", module.name));
        }

        let count = |status| modules.iter().filter(|m| m.status == status).count();
        self.info(&format!(
            "{} modules: \x1b[32m{} ok\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[31m{} failed\x1b[0m",
            modules.len(),
            count(ModuleStatus::Ok),
            count(ModuleStatus::Skipped),
            count(ModuleStatus::Failed),
        ));
        self.info(&format!("\x1b[2mlog: {}\x1b[0m", self.log_file.display()));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>) {
        self.record_module(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new_has_no_entries() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.module_entries().is_empty());
    }

    #[test]
    fn record_module_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_module("Foo", ModuleStatus::Skipped, Some("no manifest"));
        let entries = log.module_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Foo");
        assert_eq!(entries[0].message, Some("no manifest".to_string()));
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let (log, _tmp, _guard) = isolated_logger();
        assert_eq!(log.failure_count(), 0);
        log.record_module("a", ModuleStatus::Ok, None);
        log.record_module("b", ModuleStatus::Failed, Some("error 1"));
        log.record_module("c", ModuleStatus::Failed, Some("error 2"));
        log.record_module("d", ModuleStatus::Skipped, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_module("via-trait", ModuleStatus::Ok, None);
        assert_eq!(log.module_entries().len(), 1);
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = fs::read_to_string(log.log_path()).unwrap();
        assert!(contents.contains("[debug]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn warn_and_error_tagged_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.warn("warn-marker");
        log.error("error-marker");
        let contents = fs::read_to_string(log.log_path()).unwrap();
        assert!(contents.contains("[warn] warn-marker"));
        assert!(contents.contains("[error] error-marker"));
    }

    #[test]
    fn stage_written_to_file_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("Deploying Foo");
        let contents = fs::read_to_string(log.log_path()).unwrap();
        assert!(contents.contains("==> Deploying Foo"));
    }

    #[test]
    fn summary_counts_statuses() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_module("a", ModuleStatus::Ok, None);
        log.record_module("b", ModuleStatus::Failed, Some("CONFLICT"));
        log.print_summary();
        let contents = fs::read_to_string(log.log_path()).unwrap();
        assert!(contents.contains("✗ b (CONFLICT)"));
        assert!(contents.contains("2 modules: 1 ok, 0 skipped, 1 failed"));
    }
}
