//! The boundary to the remote query engine.
//!
//! Commands depend only on [`Connector`] and [`Session`]. The production
//! implementation, [`HttpConnector`], talks to the cluster's REST services:
//!
//! - `GET  http://host:<management>/pools/default` to check reachability and credentials
//! - `POST http://host:<query>/query/service` to run a statement
//!
//! Tests substitute in-memory implementations that return canned rows or
//! errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::types::{ClusterTarget, Credentials, QueryMetrics, QueryRequest, QueryResult, Timeouts};
use crate::{Error, Result};

/// Extra time the HTTP client waits past the query timeout, so that the
/// service's own timeout error arrives before the transport gives up.
const QUERY_TIMEOUT_GRACE: Duration = Duration::from_secs(2);

/// Service error code for a statement that exceeded its timeout.
const SERVICE_TIMEOUT_CODE: i64 = 1080;

/// Opens sessions against a cluster.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Verify the cluster is reachable with these credentials and return a
    /// session bound to them.
    async fn connect(
        &self,
        target: &ClusterTarget,
        credentials: &Credentials,
        timeouts: Timeouts,
    ) -> Result<Box<dyn Session>>;
}

/// A connected session that can run statements.
#[async_trait]
pub trait Session: Send + Sync {
    /// Run one statement and collect every row.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult>;
}

/// [`Connector`] backed by the cluster's HTTP services.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector;

impl HttpConnector {
    /// Create a connector.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(
        &self,
        target: &ClusterTarget,
        credentials: &Credentials,
        timeouts: Timeouts,
    ) -> Result<Box<dyn Session>> {
        let client = Client::builder()
            .connect_timeout(timeouts.operation)
            .user_agent(concat!("qtool/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Connection(format!("failed to build HTTP client: {e}")))?;

        let probe = join(&target.management_url()?, "pools/default")?;
        debug!("Probing {} as '{}'", probe, credentials.username);

        let response = client
            .get(probe)
            .basic_auth(&credentials.username, Some(credentials.password.expose()))
            .timeout(timeouts.operation)
            .send()
            .await
            .map_err(|e| transport_error(target, &e, timeouts.operation))?;

        match response.status() {
            status if status.is_success() => {},
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Connection(format!(
                    "authentication failed for user '{}' at {target}",
                    credentials.username
                )));
            },
            StatusCode::NOT_FOUND => {
                return Err(Error::Connection(format!(
                    "node at {target} is not part of an initialized cluster"
                )));
            },
            status => {
                return Err(Error::Connection(format!(
                    "{target} responded with HTTP {status}"
                )));
            },
        }

        info!("Connected to {}", target);
        Ok(Box::new(HttpSession {
            client,
            endpoint: join(&target.query_url()?, "query/service")?,
            credentials: credentials.clone(),
            timeouts,
        }))
    }
}

/// [`Session`] that posts statements to the query service.
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
    timeouts: Timeouts,
}

#[async_trait]
impl Session for HttpSession {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult> {
        let mut form: Vec<(&str, String)> = vec![
            ("statement", request.statement.clone()),
            ("timeout", format!("{}ms", self.timeouts.query.as_millis())),
            ("metrics", "true".to_string()),
        ];
        if let Some(context) = request.query_context()? {
            form.push(("query_context", context));
        }

        debug!("POST {} ({} bytes of statement)", self.endpoint, request.statement.len());
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password.expose()),
            )
            .form(&form)
            .timeout(self.timeouts.query + QUERY_TIMEOUT_GRACE)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!(
                        "query did not complete within {:?}",
                        self.timeouts.query
                    ))
                } else {
                    Error::Query(format!("request to query service failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Query(format!("failed to read response: {e}")))?;

        decode_response(status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    errors: Vec<ServiceError>,
    #[serde(default)]
    metrics: Option<QueryMetrics>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: String,
}

fn decode_response(status: StatusCode, body: &str) -> Result<QueryResult> {
    let parsed: ServiceResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            return Err(Error::Query(
                "query service rejected the credentials".to_string(),
            ));
        },
        Err(e) => {
            return Err(Error::Query(format!(
                "failed to parse response (HTTP {status}): {e}"
            )));
        },
    };

    if !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .iter()
            .map(|err| match err.code {
                Some(code) => format!("[{code}] {}", err.msg),
                None => err.msg.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        if parsed
            .errors
            .iter()
            .any(|err| err.code == Some(SERVICE_TIMEOUT_CODE))
        {
            return Err(Error::Timeout(message));
        }
        return Err(Error::Query(message));
    }

    if !status.is_success() {
        return Err(Error::Query(format!(
            "query service responded with HTTP {status}"
        )));
    }

    match parsed.status.as_deref() {
        None | Some("success") => {},
        Some(other) => {
            return Err(Error::Query(format!(
                "query finished with status '{other}'"
            )));
        },
    }

    debug!("Decoded {} row(s)", parsed.results.len());
    Ok(QueryResult {
        rows: parsed.results,
        metrics: parsed.metrics,
    })
}

fn transport_error(target: &ClusterTarget, err: &reqwest::Error, limit: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout(format!("no response from {target} within {limit:?}"))
    } else {
        Error::Connection(format!("cannot reach {target}: {err}"))
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::InvalidAddress(format!("{base}{path}: {e}")))
}
