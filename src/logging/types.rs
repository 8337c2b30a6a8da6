//! Core logging types: module entries, status, and the [`Log`] trait.

/// Per-module result for summary reporting.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    /// Module name.
    pub name: String,
    /// Final status of the module.
    pub status: ModuleStatus,
    /// Optional detail message (e.g., link counts or the error).
    pub message: Option<String>,
}

/// Status of a module after a command ran over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Module was deployed (or updated) successfully.
    Ok,
    /// Module was not processed (e.g. no manifest).
    Skipped,
    /// Module failed; the error was logged.
    Failed,
}

/// Abstraction over logging backends.
///
/// The deployment engine logs through this trait so tests can capture
/// messages instead of going through the global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a module result for the summary.
    fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn module_status_equality() {
        assert_eq!(ModuleStatus::Ok, ModuleStatus::Ok);
        assert_ne!(ModuleStatus::Ok, ModuleStatus::Failed);
        assert_ne!(ModuleStatus::Skipped, ModuleStatus::Failed);
    }

    #[test]
    fn module_entry_clone() {
        let entry = ModuleEntry {
            name: "Fooman_Speedster".to_string(),
            status: ModuleStatus::Ok,
            message: Some("3 created".to_string()),
        };
        let cloned = entry.clone();
        assert_eq!(cloned.name, entry.name);
        assert_eq!(cloned.status, entry.status);
        assert_eq!(cloned.message, entry.message);
    }
}
