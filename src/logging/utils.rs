//! Log file location, colour stripping and timestamps.
use std::path::PathBuf;

/// Environment variable naming the log directory directly.
const LOG_DIR_ENV: &str = "MODMAN_LOG_DIR";

/// Remove ANSI CSI sequences (`ESC [ ... final-byte`) and lone escapes.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('[') => {
                // Parameters and intermediates run up to a final byte in `@`..=`~`.
                chars
                    .by_ref()
                    .take_while(|c| !('@'..='~').contains(c))
                    .for_each(drop);
            }
            Some(_) | None => {}
        }
    }
    out
}

/// Directory holding the per-command log files.
///
/// `MODMAN_LOG_DIR` wins; otherwise `$XDG_CACHE_HOME/modman`, falling back
/// to `~/.cache/modman`.  Nothing is created.
pub(super) fn cache_dir() -> PathBuf {
    let non_empty = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty());
    if let Some(dir) = non_empty(LOG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let cache = non_empty("XDG_CACHE_HOME").map_or_else(
        || {
            non_empty("HOME")
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    cache.join("modman")
}

/// Log file of `command`, e.g. `~/.cache/modman/deploy-all.log`.
pub(super) fn log_file_path(command: &str) -> PathBuf {
    cache_dir().join(command).with_extension("log")
}

/// Current UTC date and time, `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%F %T").to_string()
}

/// Current UTC time, `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%T").to_string()
}

#[cfg(test)]
#[allow(unsafe_code)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::TEST_ENV_MUTEX;

    fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
        let _lock = TEST_ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let saved: Vec<_> = vars
            .iter()
            .map(|(k, _)| (*k, std::env::var_os(k)))
            .collect();
        // SAFETY: Protected by TEST_ENV_MUTEX; restored before the lock is released.
        unsafe {
            for (k, v) in vars {
                match v {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
        }
        let result = f();
        unsafe {
            for (k, v) in saved {
                match v {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
        }
        result
    }

    #[test]
    fn strip_ansi_removes_sgr_and_csi() {
        assert_eq!(strip_ansi("\x1b[31merror:\x1b[0m hello"), "error: hello");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mDeploying Foo\x1b[0m"),
            "==> Deploying Foo"
        );
        assert_eq!(strip_ansi("\x1b[2Jclear"), "clear");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn strip_ansi_drops_lone_escape() {
        assert_eq!(strip_ansi("\x1bMtext"), "text");
        assert_eq!(strip_ansi("trailing\x1b"), "trailing");
    }

    #[test]
    fn log_path_uses_xdg_cache_home() {
        let path = with_env(
            &[
                ("MODMAN_LOG_DIR", None),
                ("XDG_CACHE_HOME", Some("/tmp/xdg-test")),
            ],
            || log_file_path("deploy-all"),
        );
        assert_eq!(path, PathBuf::from("/tmp/xdg-test/modman/deploy-all.log"));
    }

    #[test]
    fn log_dir_override_wins() {
        let path = with_env(
            &[
                ("MODMAN_LOG_DIR", Some("/var/log/modman")),
                ("XDG_CACHE_HOME", Some("/tmp/xdg-test")),
            ],
            || log_file_path("clean"),
        );
        assert_eq!(path, PathBuf::from("/var/log/modman/clean.log"));
    }

    #[test]
    fn timestamps_have_fixed_width() {
        let time = format_utc_time();
        assert_eq!(time.len(), 8);
        assert_eq!(&time[2..3], ":");
        let datetime = format_utc_datetime();
        assert_eq!(datetime.len(), 19);
        assert_eq!(&datetime[4..5], "-");
        assert_eq!(&datetime[10..11], " ");
    }
}
