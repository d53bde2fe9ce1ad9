//! CLI error handling with semantic exit codes.
//!
//! Every failure is mapped onto a category so that shell scripts can react
//! to the kind of failure without parsing messages.
//!
//! # Exit Code Categories
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed successfully |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid arguments or settings |
//! | 3 | `NotConfigured` | Connection settings are missing |
//! | 4 | `Query` | The query service rejected the statement |
//! | 5 | `Connection` | Cluster unreachable or credentials rejected |
//! | 6 | `Timeout` | Operation timed out |
//!
//! # Usage
//!
//! ```bash
//! qtool execute -q "SELECT 1"
//! case $? in
//!     0) echo "ok" ;;
//!     3) qtool configure ;;
//!     *) echo "failed" ;;
//! esac
//! ```

use std::fmt;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments or settings (exit code 2).
    ///
    /// Also used for a settings file that cannot be parsed and for missing
    /// input when prompting is not possible.
    Usage = 2,

    /// Address or credentials are not available (exit code 3).
    NotConfigured = 3,

    /// The statement failed on the query service (exit code 4).
    Query = 4,

    /// The cluster could not be reached or refused the credentials (exit code 5).
    Connection = 5,

    /// Operation timed out (exit code 6).
    Timeout = 6,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::NotConfigured => "not configured",
            Self::Query => "query error",
            Self::Connection => "connection error",
            Self::Timeout => "timeout",
        }
    }

    /// Map a core error onto its category.
    #[must_use]
    pub const fn from_core(err: &qtool_core::Error) -> Self {
        match err {
            qtool_core::Error::Io(_) | qtool_core::Error::Serialization(_) => Self::Internal,
            qtool_core::Error::Config(_)
            | qtool_core::Error::Parse { .. }
            | qtool_core::Error::InvalidAddress(_) => Self::Usage,
            qtool_core::Error::Connection(_) => Self::Connection,
            qtool_core::Error::Query(_) => Self::Query,
            qtool_core::Error::Timeout(_) => Self::Timeout,
        }
    }

    /// Infer the error category from an error message.
    ///
    /// Fallback for errors that carry neither a [`CliError`] nor a core
    /// error in their chain.
    #[must_use]
    pub fn infer_from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        // Checked before connection so "connection timed out" lands here
        if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
            return Self::Timeout;
        }

        if msg_lower.contains("connection")
            || msg_lower.contains("connect")
            || msg_lower.contains("unreachable")
            || msg_lower.contains("dns")
            || msg_lower.contains("authentication")
        {
            return Self::Connection;
        }

        if msg_lower.contains("not configured") || msg_lower.contains("qtool configure") {
            return Self::NotConfigured;
        }

        if msg_lower.contains("query") || msg_lower.contains("syntax error") {
            return Self::Query;
        }

        if msg_lower.contains("invalid argument")
            || msg_lower.contains("missing required")
            || msg_lower.contains("invalid value")
            || msg_lower.contains("unknown setting")
        {
            return Self::Usage;
        }

        Self::Internal
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
///
/// ```rust,ignore
/// use qtool_cli::error::CliError;
/// use anyhow::anyhow;
///
/// let err = CliError::not_configured(anyhow!("no password configured"));
/// assert_eq!(err.exit_code(), 3);
/// ```
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Create a not-configured error.
    pub fn not_configured(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::NotConfigured, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// An explicit [`CliError`] wins, then a [`qtool_core::Error`] anywhere in
/// the chain, then message inference.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }

    if let Some(core_err) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<qtool_core::Error>())
    {
        return ErrorCategory::from_core(core_err).exit_code();
    }

    ErrorCategory::infer_from_message(&err.to_string()).exit_code()
}

/// Hint printed after an error that re-running might get past.
///
/// Only failures whose core error reports itself as recoverable (timeouts,
/// interrupted I/O) get one.
#[must_use]
pub fn retry_hint(err: &anyhow::Error) -> Option<&'static str> {
    let core_err = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<qtool_core::Error>())?;
    if !core_err.is_recoverable() {
        return None;
    }
    Some(match core_err {
        qtool_core::Error::Timeout(_) => {
            "the cluster may be busy; retry, or raise --timeout / --query-timeout"
        },
        _ => "this may be transient; retry the command",
    })
}

/// Whether the failure is stdout closing under us (e.g. `| head`).
#[must_use]
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::BrokenPipe)
    })
}
