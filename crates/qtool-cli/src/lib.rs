//! qtool CLI - run N1QL statements against a Couchbase cluster
//!
//! The binary in `main.rs` only maps the result of [`run`] onto an exit
//! code; everything else lives here so that integration tests and other
//! front ends can drive the same commands.

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use qtool_core::{ConfigStore, HttpConnector};
use tracing::debug;

mod cli;
mod commands;
pub mod error;
mod output;
mod utils;

use crate::cli::{Cli, Commands};
use crate::utils::initialize_logging;
use crate::utils::prompt::TerminalPrompter;

/// Execute the qtool CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns an error if logging cannot be initialized or the command fails.
/// Use [`error::exit_code_from_error`] to turn it into an exit code.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let store = cli
        .config
        .clone()
        .map_or_else(ConfigStore::at_default_location, ConfigStore::open);
    debug!("Using settings file {}", store.path().display());

    execute_command(cli, &store).await
}

async fn execute_command(cli: Cli, store: &ConfigStore) -> Result<()> {
    let mut stdout = io::stdout();

    match cli.command {
        Some(Commands::Configure(args)) => {
            commands::configure(store, args, &TerminalPrompter::detect(), &mut stdout)?;
        },
        Some(Commands::Execute(args)) => {
            commands::execute(store, &HttpConnector::new(), args, &mut stdout).await?;
        },
        Some(Commands::Config { command }) => {
            commands::config::run(store, command, &mut stdout)?;
        },
        Some(Commands::Completions { shell }) => {
            commands::generate(shell, &mut stdout)?;
        },
        None => {
            Cli::command().print_help()?;
        },
    }

    Ok(())
}
