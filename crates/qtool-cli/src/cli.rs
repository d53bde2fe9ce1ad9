//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Store connection settings (prompts for anything omitted)
//! qtool configure -a 10.0.0.5:8091 -u Administrator
//!
//! # Run a statement with the stored settings
//! qtool execute -q 'SELECT name, geo FROM `travel-sample` LIMIT 5'
//!
//! # Override a stored setting for one run
//! qtool execute -a 10.0.0.6 -q "SELECT RAW 1" -f json
//!
//! # Inspect or edit individual settings
//! qtool config show
//! qtool config set format csv
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::output::DisplayFormat;

/// Main CLI structure for the `qtool` command
#[derive(Parser, Clone, Debug)]
#[command(name = "qtool")]
#[command(version)]
#[command(about = "qtool - run N1QL statements against a Couchbase cluster", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Settings file (defaults to `.configs.ini` next to the executable). Also via `QTOOL_CONFIG`.
    #[arg(long, global = true, value_name = "FILE", env = "QTOOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

/// Available subcommands for the `qtool` CLI
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Save the cluster address and credentials
    Configure(ConfigureArgs),

    /// Run a N1QL statement and print the rows
    Execute(ExecuteArgs),

    /// Inspect or edit stored settings
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommand>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `qtool configure`
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigureArgs {
    /// Cluster address or IP, `host[:port]` (prompted when omitted)
    #[arg(short = 'a', long)]
    pub address: Option<String>,

    /// Cluster username (prompted when omitted)
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Cluster password (prompted without echo when omitted)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Default display format for `execute`
    #[arg(long, value_enum)]
    pub format: Option<DisplayFormat>,

    /// Default query context, as `bucket.scope`
    #[arg(long)]
    pub scope: Option<String>,

    /// Preferred collection within the scope
    #[arg(long)]
    pub collection: Option<String>,

    /// Port of the query service
    #[arg(long, value_name = "PORT")]
    pub query_port: Option<u16>,
}

/// Arguments for `qtool execute`
#[derive(Args, Clone, Debug)]
pub struct ExecuteArgs {
    /// Cluster address or IP (overrides the stored value)
    #[arg(short = 'a', long)]
    pub address: Option<String>,

    /// Cluster username (overrides the stored value)
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Cluster password (overrides the stored value)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// N1QL statement to run
    #[arg(short = 'q', long)]
    pub query: String,

    /// Display format (defaults to the stored format, then `table`)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<DisplayFormat>,

    /// Query context, as `bucket.scope`
    #[arg(long)]
    pub scope: Option<String>,

    /// Port of the query service
    #[arg(long, value_name = "PORT")]
    pub query_port: Option<u16>,

    /// Seconds allowed for connecting to the cluster
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 5)]
    pub timeout_secs: u64,

    /// Seconds allowed for the statement to run
    #[arg(long = "query-timeout", value_name = "SECS", default_value_t = 10)]
    pub query_timeout_secs: u64,
}

/// Subcommands of `qtool config`
#[derive(Subcommand, Clone, Debug)]
pub enum ConfigCommand {
    /// Show every stored setting (default)
    Show,

    /// Print one setting
    Get {
        /// Setting name (address, username, password, format, scope, collection, `query_port`)
        key: String,
    },

    /// Store one setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },

    /// Remove one setting
    Unset {
        /// Setting name
        key: String,
    },

    /// Print the settings file location
    Path,
}
