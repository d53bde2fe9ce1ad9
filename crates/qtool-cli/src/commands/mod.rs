//! Command implementations for the qtool CLI.

mod completions;
pub mod config;
mod configure;
mod execute;

pub use completions::generate;
pub use configure::execute as configure;
pub use execute::execute;
