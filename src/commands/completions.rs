//! Command: print shell completions.
use clap::CommandFactory as _;

use crate::cli::{Cli, CompletionsOpts};

/// Write a completion script for `opts.shell` to stdout.
pub fn run(opts: CompletionsOpts) {
    let mut cmd = Cli::command();
    clap_complete::generate(opts.shell, &mut cmd, "modman", &mut std::io::stdout().lock());
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap_complete::Shell;

    #[test]
    fn generates_for_every_shell() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            let mut buf = Vec::new();
            clap_complete::generate(shell, &mut Cli::command(), "modman", &mut buf);
            let script = String::from_utf8(buf).unwrap();
            assert!(script.contains("deploy-all"), "{shell:?} script lacks subcommands");
        }
    }
}
