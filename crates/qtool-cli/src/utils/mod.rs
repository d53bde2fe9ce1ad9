//! Shared helpers for the CLI.

pub mod logging;
pub mod prompt;

pub use logging::initialize_logging;
