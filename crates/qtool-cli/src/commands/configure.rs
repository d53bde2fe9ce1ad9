//! `qtool configure`: store the cluster address and credentials.

use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;
use qtool_core::config::{CLUSTER_SECTION, DEFAULT_ADDRESS, DEFAULT_USERNAME, keys};
use qtool_core::{ConfigStore, Secret};
use tracing::info;

use super::config::ConfigKey;
use crate::cli::ConfigureArgs;
use crate::utils::prompt::Prompter;

/// Collect the connection settings, prompting for any the caller left out,
/// and write them to `store` in one rewrite.
///
/// Prompts offer the stored value (or the built-in default) so that pressing
/// enter keeps it. The saved values are read back and echoed; the password is
/// only ever shown masked.
pub fn execute(
    store: &ConfigStore,
    args: ConfigureArgs,
    prompter: &dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    let address = match args.address {
        Some(address) => address,
        None => {
            let current = store.get(CLUSTER_SECTION, keys::ADDRESS, DEFAULT_ADDRESS);
            prompter.text("Cluster address or IP", Some(&current))?
        },
    };
    let username = match args.username {
        Some(username) => username,
        None => {
            let current = store.get(CLUSTER_SECTION, keys::USERNAME, DEFAULT_USERNAME);
            prompter.text("Cluster username", Some(&current))?
        },
    };
    let password = Secret::new(match args.password {
        Some(password) => password,
        None => prompter.password("Cluster password")?,
    });

    let address = address.trim();
    let username = username.trim();
    ConfigKey::Address.validate(address)?;
    ConfigKey::Username.validate(username)?;

    let mut pairs: Vec<(&str, &str)> = vec![
        (keys::ADDRESS, address),
        (keys::USERNAME, username),
        (keys::PASSWORD, password.expose()),
    ];

    if let Some(format) = args.format {
        pairs.push((keys::FORMAT, format.as_str()));
    }
    if let Some(scope) = args.scope.as_deref().map(str::trim) {
        ConfigKey::Scope.validate(scope)?;
        pairs.push((keys::SCOPE, scope));
    }
    if let Some(collection) = args.collection.as_deref().map(str::trim) {
        pairs.push((keys::COLLECTION, collection));
    }
    let query_port = args.query_port.map(|p| p.to_string());
    if let Some(port) = query_port.as_deref() {
        ConfigKey::QueryPort.validate(port)?;
        pairs.push((keys::QUERY_PORT, port));
    }

    store
        .set_many(CLUSTER_SECTION, &pairs)
        .with_context(|| format!("failed to save settings to {}", store.path().display()))?;
    info!("Saved {} setting(s) to {}", pairs.len(), store.path().display());

    writeln!(
        out,
        "{} {}",
        "Saved settings to".green(),
        store.path().display()
    )?;
    for (key, _) in &pairs {
        let key = ConfigKey::parse(key)?;
        let saved = store.get(CLUSTER_SECTION, key.as_str(), "");
        writeln!(out, "  {}: {}", key.as_str(), key.display(&saved))?;
    }
    Ok(())
}
