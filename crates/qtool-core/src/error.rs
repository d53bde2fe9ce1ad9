//! Error types and handling for qtool-core operations.
//!
//! Errors fall into a handful of categories:
//!
//! - **I/O and configuration**: reading or rewriting the settings file
//! - **Parse**: the settings file is not valid INI
//! - **Connection**: the cluster could not be reached or refused the credentials
//! - **Query**: the query service rejected the statement or returned an unreadable response
//! - **Timeout**: either the operation or the query timeout elapsed
//!
//! No layer retries. [`Error::is_recoverable`] only reports whether a retry
//! by the user might succeed, so the CLI can phrase its message accordingly.
//!
//! ```rust
//! use qtool_core::Error;
//!
//! let err = Error::Connection("authentication failed for user 'admin'".into());
//! assert_eq!(err.category(), "connection");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// The main error type for qtool-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation on the settings file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file could not be used (unwritable location, corrupt
    /// file that must not be overwritten, unknown key).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The settings file is not valid INI.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number of the offending line.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// The cluster address could not be understood.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The cluster could not be reached, or rejected the credentials.
    ///
    /// ## Common Causes
    ///
    /// - Wrong host or port
    /// - Wrong username or password
    /// - Management service not running on the node
    #[error("Connection error: {0}")]
    Connection(String),

    /// The query service rejected the statement, failed while executing it,
    /// or returned a response that could not be decoded.
    #[error("Query error: {0}")]
    Query(String),

    /// The operation or query timeout elapsed.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if re-running the same command might succeed.
    ///
    /// Timeouts and interrupted I/O are transient; authentication failures,
    /// malformed statements, and corrupt files are not.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// - `"io"` - settings file I/O
    /// - `"config"` - unusable settings
    /// - `"parse"` - malformed settings file
    /// - `"invalid_address"` - unparsable cluster address
    /// - `"connection"` - cluster unreachable or credentials rejected
    /// - `"query"` - statement or response failure
    /// - `"timeout"` - a timeout elapsed
    /// - `"serialization"` - data format conversion
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Parse { .. } => "parse",
            Self::InvalidAddress(_) => "invalid_address",
            Self::Connection(_) => "connection",
            Self::Query(_) => "query",
            Self::Timeout(_) => "timeout",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
