//! Command: print version information.
use anyhow::Result;
use std::io::Write as _;

/// Version string, preferring the one stamped in by the build script.
#[must_use]
pub fn version() -> &'static str {
    option_env!("MODMAN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the modman version to stdout.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn run() -> Result<()> {
    writeln!(std::io::stdout().lock(), "modman {}", version())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
