//! Command-line interface definition.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the modman deployment engine.
#[derive(Parser, Debug)]
#[command(
    name = "modman",
    about = "Deploy independently versioned modules into a project tree with links",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Directory to start the registry search from
    #[arg(long, global = true, env = "MODMAN_ROOT")]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a module registry in the current directory
    Init(InitOpts),
    /// List checked-out modules
    List,
    /// Deploy one module's links
    Deploy(ModuleOpts),
    /// Deploy every module
    DeployAll(DeployOpts),
    /// Update a module's checkout, then deploy it
    Update(ModuleOpts),
    /// Update and deploy every module
    UpdateAll(DeployOpts),
    /// Clone a module with git, then deploy it
    Clone(CloneOpts),
    /// Delete a module's checkout and the links it leaves dangling
    Remove(RemoveOpts),
    /// Remove dead links from the project
    Clean,
    /// Print shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::List => "list",
            Self::Deploy(_) => "deploy",
            Self::DeployAll(_) => "deploy-all",
            Self::Update(_) => "update",
            Self::UpdateAll(_) => "update-all",
            Self::Clone(_) => "clone",
            Self::Remove(_) => "remove",
            Self::Clean => "clean",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `init` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InitOpts {
    /// Project root to link into, relative to the current directory or absolute
    pub basedir: Option<String>,
}

/// Options controlling how links are written.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct DeployOpts {
    /// Replace files and directories occupying link destinations
    #[arg(short, long)]
    pub force: bool,

    /// Create hard links instead of symlinks
    #[arg(long)]
    pub copy: bool,
}

/// Options for subcommands acting on one module.
#[derive(Args, Debug, Clone)]
pub struct ModuleOpts {
    /// Module name (its directory under .modman)
    pub module: String,

    /// Link options.
    #[command(flatten)]
    pub deploy: DeployOpts,
}

/// Options for the `clone` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CloneOpts {
    /// Repository URL
    pub url: String,

    /// Module name (defaults to the repository name)
    #[arg(long)]
    pub name: Option<String>,

    /// Branch to check out
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Link options.
    #[command(flatten)]
    pub deploy: DeployOpts,
}

/// Options for the `remove` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RemoveOpts {
    /// Module name
    pub module: String,
}

/// Options for the `completions` subcommand.
#[derive(Args, Debug, Clone, Copy)]
pub struct CompletionsOpts {
    /// Target shell
    pub shell: clap_complete::Shell,
}
