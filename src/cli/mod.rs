//! Line-oriented shell driving the sync store from a terminal or a script.

pub mod commands;
pub mod output;
pub mod shell;

use thiserror::Error;

use crate::{core::services::ServiceError, errors::StoreError};

pub use commands::{CliMode, LoopControl, ShellContext};
pub use shell::run_cli;

/// Environment variable switching the shell into non-interactive script mode.
pub const SCRIPT_ENV: &str = "EXPENSE_CORE_CLI_SCRIPT";

/// Failures that end the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Failures of a single command; reported and the shell keeps running.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command `{0}`")]
    Unknown(String),
    #[error("No user logged in. Use `login <user-id>` first.")]
    NotLoggedIn,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
