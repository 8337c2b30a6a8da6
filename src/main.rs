//! `modman` command-line entry point.
use anyhow::Result;
use clap::Parser;

use modman_cli::cli::{Cli, Command};
use modman_cli::commands;
use modman_cli::exec::SystemExecutor;
use modman_cli::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let args = Cli::parse();

    match &args.command {
        Command::Completions(opts) => {
            commands::completions::run(*opts);
            return Ok(());
        }
        Command::Version => return commands::version::run(),
        _ => {}
    }

    let name = args.command.name();
    init_subscriber(args.verbose, name);
    let log = Logger::new(name);
    let executor = SystemExecutor;

    match &args.command {
        Command::Init(opts) => commands::init::run(&args.global, opts, &log),
        Command::List => commands::list::run(&args.global, &log),
        Command::Deploy(opts) => commands::deploy::run(&args.global, opts, &log, &executor),
        Command::DeployAll(opts) => {
            commands::deploy::run_all(&args.global, *opts, &log, &executor)
        }
        Command::Update(opts) => commands::update::run(&args.global, opts, &log, &executor),
        Command::UpdateAll(opts) => {
            commands::update::run_all(&args.global, *opts, &log, &executor)
        }
        Command::Clone(opts) => commands::clone::run(&args.global, opts, &log, &executor),
        Command::Remove(opts) => commands::remove::run(&args.global, opts, &log),
        Command::Clean => commands::clean::run(&args.global, &log),
        Command::Completions(_) | Command::Version => Ok(()),
    }
}
