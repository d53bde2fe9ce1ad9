use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::secret::Secret;
use crate::{Error, Result};

/// One row returned by the query service.
pub type Record = Value;

/// A row after flattening: dotted path to leaf value, in first-seen order.
pub type FlatRecord = Map<String, Value>;

/// Management port used when the address has none.
pub const DEFAULT_MANAGEMENT_PORT: u16 = 8091;

/// Query service port used unless overridden.
pub const DEFAULT_QUERY_PORT: u16 = 8093;

/// Username and password for basic auth.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Cluster username.
    pub username: String,
    /// Cluster password.
    pub password: Secret,
}

impl Credentials {
    /// Bundle a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<Secret>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// The two durations passed across the query boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Bound on connection bootstrap and other short operations.
    pub operation: Duration,
    /// Bound on a single statement.
    pub query: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            operation: Duration::from_secs(5),
            query: Duration::from_secs(10),
        }
    }
}

/// Where the cluster lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTarget {
    host: String,
    management_port: u16,
    query_port: u16,
}

impl ClusterTarget {
    /// Parse `host[:port]`, optionally prefixed by `couchbase://` or `http://`.
    ///
    /// The port, when present, is the management port.
    pub fn parse(address: &str) -> Result<Self> {
        let trimmed = address.trim();
        let without_scheme = ["couchbase://", "http://"]
            .iter()
            .find_map(|scheme| trimmed.strip_prefix(scheme))
            .unwrap_or(trimmed)
            .trim_end_matches('/');

        if without_scheme.is_empty() {
            return Err(Error::InvalidAddress("address is empty".to_string()));
        }
        if without_scheme.contains("://") {
            return Err(Error::InvalidAddress(format!(
                "unsupported scheme in '{address}'"
            )));
        }

        let url = Url::parse(&format!("http://{without_scheme}/"))
            .map_err(|e| Error::InvalidAddress(format!("'{address}': {e}")))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::InvalidAddress(format!("'{address}' has no host")))?;
        if url.path() != "/" {
            return Err(Error::InvalidAddress(format!(
                "'{address}' must not contain a path"
            )));
        }

        Ok(Self {
            host: host.to_string(),
            management_port: url.port().unwrap_or(DEFAULT_MANAGEMENT_PORT),
            query_port: DEFAULT_QUERY_PORT,
        })
    }

    /// Override the query service port.
    #[must_use]
    pub fn with_query_port(mut self, port: u16) -> Self {
        self.query_port = port;
        self
    }

    /// Host name or IP.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Management service port.
    pub const fn management_port(&self) -> u16 {
        self.management_port
    }

    /// Query service port.
    pub const fn query_port(&self) -> u16 {
        self.query_port
    }

    /// Base URL of the management service.
    pub fn management_url(&self) -> Result<Url> {
        self.base_url(self.management_port)
    }

    /// Base URL of the query service.
    pub fn query_url(&self) -> Result<Url> {
        self.base_url(self.query_port)
    }

    fn base_url(&self, port: u16) -> Result<Url> {
        let mut url = Url::parse("http://localhost/")
            .map_err(|e| Error::InvalidAddress(e.to_string()))?;
        url.set_host(Some(&self.host))
            .map_err(|e| Error::InvalidAddress(format!("'{}': {e}", self.host)))?;
        url.set_port(Some(port))
            .map_err(|()| Error::InvalidAddress(format!("cannot set port {port}")))?;
        Ok(url)
    }
}

impl std::fmt::Display for ClusterTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.management_port)
    }
}

/// A statement plus the options sent with it.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// Statement text, passed through unchanged.
    pub statement: String,
    /// `bucket.scope` to resolve unqualified keyspaces against.
    pub scope: Option<String>,
}

impl QueryRequest {
    /// A request with no query context.
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            scope: None,
        }
    }

    /// Set the query context.
    #[must_use]
    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope.filter(|s| !s.trim().is_empty());
        self
    }

    /// Render the scope as a `query_context` value, `default:`bucket`.`scope``.
    pub fn query_context(&self) -> Result<Option<String>> {
        let Some(scope) = self.scope.as_deref() else {
            return Ok(None);
        };
        let (bucket, scope_name) = scope
            .trim()
            .split_once('.')
            .filter(|(b, s)| !b.is_empty() && !s.is_empty() && !s.contains('.'))
            .ok_or_else(|| {
                Error::Config(format!(
                    "scope must be written as 'bucket.scope', got '{scope}'"
                ))
            })?;
        Ok(Some(format!("default:`{bucket}`.`{scope_name}`")))
    }
}

/// Metrics reported by the query service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetrics {
    /// Server-side execution time, e.g. `"1.2345ms"`.
    #[serde(default)]
    pub execution_time: Option<String>,
    /// Total elapsed time including queueing.
    #[serde(default)]
    pub elapsed_time: Option<String>,
    /// Rows returned.
    #[serde(default)]
    pub result_count: Option<u64>,
}

/// Rows and metrics for one statement.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Result rows in service order.
    pub rows: Vec<Record>,
    /// Metrics, when the service sent them.
    pub metrics: Option<QueryMetrics>,
}

impl QueryResult {
    /// Server-reported execution time, if any.
    pub fn execution_time(&self) -> Option<&str> {
        self.metrics.as_ref()?.execution_time.as_deref()
    }
}
