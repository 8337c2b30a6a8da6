//! Module deployment engine.
//!
//! Deploys independently versioned modules, each checked out under a
//! project's `.modman` registry, into the project tree as relative links
//! described by the module's `modman` manifest.  Manifests may import other
//! manifests and run shell hooks.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: locate the registry and parse manifests
//! - **[`resources`]**: idempotent `check + apply` link primitives
//! - **[`deploy`]**: plan a manifest tree, then reconcile its links
//! - **[`commands`]**: top-level subcommand orchestration (`deploy`, `update`, `clean`, ...)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod resources;
pub mod vcs;
