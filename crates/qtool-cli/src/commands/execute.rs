//! `qtool execute`: run one statement and print the flattened rows.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use qtool_core::config::{CLUSTER_SECTION, keys};
use qtool_core::{
    ClusterTarget, ConfigStore, Connector, Credentials, Flattener, QueryRequest, Secret, Session,
    Timeouts,
};
use tracing::{debug, info, warn};

use crate::cli::ExecuteArgs;
use crate::error::CliError;
use crate::output::{DisplayFormat, RowFormatter};

/// Settings for one run after merging flags over stored values.
#[derive(Debug)]
struct ResolvedSettings {
    address: String,
    credentials: Credentials,
    format: DisplayFormat,
    scope: Option<String>,
    query_port: Option<u16>,
}

/// Connect, run the statement, and write the rows to `out`.
///
/// Flags win over stored settings. Missing address or credentials fail with
/// [`ErrorCategory::NotConfigured`](crate::error::ErrorCategory) before the
/// connector is touched. Progress lines go to stderr; `out` receives the
/// rows followed, for the grid formats, by the execution time.
pub async fn execute(
    store: &ConfigStore,
    connector: &dyn Connector,
    args: ExecuteArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let settings = resolve_settings(store, &args)?;

    let mut target = ClusterTarget::parse(&settings.address)
        .with_context(|| format!("cannot use address '{}'", settings.address))?;
    if let Some(port) = settings.query_port {
        target = target.with_query_port(port);
    }
    let timeouts = Timeouts {
        operation: Duration::from_secs(args.timeout_secs),
        query: Duration::from_secs(args.query_timeout_secs),
    };
    let request = QueryRequest::new(args.query).with_scope(settings.scope);
    // Fail on a malformed scope before any network traffic
    request.query_context()?;

    eprintln!("{}", format!("CONNECTING TO '{}'", settings.address).green());
    let session = connector
        .connect(&target, &settings.credentials, timeouts)
        .await
        .context("connection failed")?;

    eprintln!("{}", request.statement.yellow());
    let result = session.query(&request).await.context("query failed")?;
    info!("Received {} row(s)", result.rows.len());

    let rows = Flattener::default().flatten_all(&result.rows);
    RowFormatter::new(settings.format).format(&rows, out)?;

    if rows.is_empty() && !settings.format.is_machine_readable() {
        eprintln!("{}", "(no rows)".dimmed());
    }

    if let Some(execution_time) = result.execution_time() {
        if settings.format.is_machine_readable() {
            eprintln!("{}", execution_time.yellow());
        } else {
            writeln!(out)?;
            writeln!(out, "{}", execution_time.yellow())?;
        }
    }
    Ok(())
}

fn resolve_settings(store: &ConfigStore, args: &ExecuteArgs) -> Result<ResolvedSettings> {
    let stored = |key: &str| {
        store
            .get_opt(CLUSTER_SECTION, key)
            .filter(|v| !v.trim().is_empty())
    };

    let address = args.address.clone().or_else(|| stored(keys::ADDRESS));
    let username = args.username.clone().or_else(|| stored(keys::USERNAME));
    let password = args.password.clone().or_else(|| stored(keys::PASSWORD));

    let missing: Vec<&str> = [
        (keys::ADDRESS, address.is_none()),
        (keys::USERNAME, username.is_none()),
        (keys::PASSWORD, password.is_none()),
    ]
    .into_iter()
    .filter_map(|(key, absent)| absent.then_some(key))
    .collect();

    let (Some(address), Some(username), Some(password)) = (address, username, password) else {
        return Err(CliError::not_configured(anyhow!(
            "no {} configured; run `qtool configure` first or pass the matching flags",
            missing.join(", ")
        ))
        .into());
    };

    let format = match args.format {
        Some(format) => format,
        None => stored(keys::FORMAT).map_or(DisplayFormat::Table, |raw| {
            DisplayFormat::from_setting(&raw).unwrap_or_else(|| {
                warn!("ignoring stored format '{raw}'; using table");
                DisplayFormat::Table
            })
        }),
    };

    let query_port = match args.query_port {
        Some(port) => Some(port),
        None => stored(keys::QUERY_PORT)
            .map(|raw| {
                raw.trim().parse::<u16>().map_err(|_| {
                    CliError::usage(anyhow!(
                        "stored query_port '{raw}' is not a port number; fix it with `qtool config set query_port <PORT>`"
                    ))
                })
            })
            .transpose()?,
    };

    let scope = args.scope.clone().or_else(|| stored(keys::SCOPE));

    debug!(
        "Resolved settings: address={address}, username={username}, format={format}, scope={scope:?}"
    );
    Ok(ResolvedSettings {
        address,
        credentials: Credentials::new(username, Secret::new(password)),
        format,
        scope,
        query_port,
    })
}
