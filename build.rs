//! Build script: embeds the modman version string via `MODMAN_VERSION`.

use std::process::Command;

/// Trimmed stdout of a successful, non-empty git query.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !text.is_empty()).then_some(text)
}

fn main() {
    println!("cargo:rerun-if-env-changed=MODMAN_VERSION");

    // Release builds pass MODMAN_VERSION; checkouts get `<pkg>+<sha>[.dirty]`.
    let version = std::env::var("MODMAN_VERSION").ok().or_else(|| {
        println!("cargo:rerun-if-changed=.git/HEAD");
        println!("cargo:rerun-if-changed=.git/index");
        let sha = git(&["rev-parse", "--short", "HEAD"])?;
        let dirty = git(&["status", "--porcelain"]).is_some();
        let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
        Some(format!("{pkg}+{sha}{}", if dirty { ".dirty" } else { "" }))
    });

    if let Some(version) = version {
        println!("cargo:rustc-env=MODMAN_VERSION={version}");
    }
}
