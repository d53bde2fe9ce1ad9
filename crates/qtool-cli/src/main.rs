//! qtool CLI entry point.

use std::process::ExitCode;

use colored::Colorize;
use qtool_cli::error::{exit_code_from_error, is_broken_pipe, retry_hint};

#[tokio::main]
async fn main() -> ExitCode {
    match qtool_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        // Output was truncated downstream (e.g. `| head`)
        Err(err) if is_broken_pipe(&err) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            if let Some(hint) = retry_hint(&err) {
                eprintln!("{} {hint}", "hint:".yellow());
            }
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
