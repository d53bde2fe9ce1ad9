//! `qtool config`: direct access to the `[CLUSTER]` settings.

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use qtool_core::config::{CLUSTER_SECTION, keys};
use qtool_core::{ClusterTarget, ConfigStore, QueryRequest, Secret};

use crate::cli::ConfigCommand;
use crate::error::CliError;
use crate::output::DisplayFormat;

/// A recognized setting in the `[CLUSTER]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Address,
    Username,
    Password,
    Format,
    Scope,
    Collection,
    QueryPort,
}

impl ConfigKey {
    const ALL: [Self; 7] = [
        Self::Address,
        Self::Username,
        Self::Password,
        Self::Format,
        Self::Scope,
        Self::Collection,
        Self::QueryPort,
    ];

    /// Parse a user-supplied key; `-` and `_` are interchangeable.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| {
                CliError::usage(anyhow!(
                    "unknown setting '{raw}'; expected one of: {}",
                    keys::ALL.join(", ")
                ))
                .into()
            })
    }

    /// Name of the key in the settings file.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Address => keys::ADDRESS,
            Self::Username => keys::USERNAME,
            Self::Password => keys::PASSWORD,
            Self::Format => keys::FORMAT,
            Self::Scope => keys::SCOPE,
            Self::Collection => keys::COLLECTION,
            Self::QueryPort => keys::QUERY_PORT,
        }
    }

    /// Reject values that would make a later `execute` fail.
    pub fn validate(self, value: &str) -> Result<()> {
        let invalid = |reason: String| -> anyhow::Error {
            CliError::usage(anyhow!(
                "invalid value for {}: {reason}",
                self.as_str()
            ))
            .into()
        };

        match self {
            Self::Address => {
                ClusterTarget::parse(value).map_err(|e| invalid(e.to_string()))?;
            },
            Self::Username if value.trim().is_empty() => {
                return Err(invalid("must not be empty".to_string()));
            },
            Self::Format => {
                if DisplayFormat::from_setting(value).is_none() {
                    return Err(invalid(format!(
                        "'{value}' is not one of table, csv, json, jsonl"
                    )));
                }
            },
            Self::Scope => {
                QueryRequest::new(String::new())
                    .with_scope(Some(value.to_string()))
                    .query_context()
                    .map_err(|e| invalid(e.to_string()))?;
            },
            Self::QueryPort => match value.trim().parse::<u16>() {
                Ok(port) if port > 0 => {},
                _ => return Err(invalid(format!("'{value}' is not a port number"))),
            },
            Self::Username | Self::Password | Self::Collection => {},
        }
        Ok(())
    }

    /// Value as it may be shown on screen.
    pub fn display(self, value: &str) -> String {
        if keys::is_sensitive(self.as_str()) {
            Secret::masked().to_string()
        } else {
            value.to_string()
        }
    }
}

/// Run a `config` subcommand. Without one, shows every setting.
pub fn run(store: &ConfigStore, command: Option<ConfigCommand>, out: &mut dyn Write) -> Result<()> {
    match command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => show(store, out),
        ConfigCommand::Get { key } => get_value(store, &key, out),
        ConfigCommand::Set { key, value } => set_value(store, &key, &value, out),
        ConfigCommand::Unset { key } => unset_value(store, &key, out),
        ConfigCommand::Path => {
            writeln!(out, "{}", store.path().display())?;
            Ok(())
        },
    }
}

fn show(store: &ConfigStore, out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "{} ({})",
        format!("[{CLUSTER_SECTION}]").bold(),
        store.path().display()
    )?;

    let width = keys::ALL.iter().map(|k| k.len()).max().unwrap_or(0);
    for key in ConfigKey::ALL {
        let value = store.get_opt(CLUSTER_SECTION, key.as_str()).map_or_else(
            || "not set".dimmed().to_string(),
            |v| key.display(&v),
        );
        writeln!(out, "  {:<width$}  {value}", key.as_str())?;
    }
    Ok(())
}

fn get_value(store: &ConfigStore, raw_key: &str, out: &mut dyn Write) -> Result<()> {
    let key = ConfigKey::parse(raw_key)?;
    match store.get_opt(CLUSTER_SECTION, key.as_str()) {
        Some(value) => writeln!(out, "{}", key.display(&value))?,
        None => writeln!(out, "{}", "not set".dimmed())?,
    }
    Ok(())
}

fn set_value(store: &ConfigStore, raw_key: &str, raw_value: &str, out: &mut dyn Write) -> Result<()> {
    let key = ConfigKey::parse(raw_key)?;
    let value = raw_value.trim();
    key.validate(value)?;

    store
        .set(CLUSTER_SECTION, key.as_str(), value)
        .with_context(|| format!("failed to update {}", store.path().display()))?;
    writeln!(out, "Set {} = {}", key.as_str(), key.display(value).green())?;
    Ok(())
}

fn unset_value(store: &ConfigStore, raw_key: &str, out: &mut dyn Write) -> Result<()> {
    let key = ConfigKey::parse(raw_key)?;
    let removed = store
        .unset(CLUSTER_SECTION, key.as_str())
        .with_context(|| format!("failed to update {}", store.path().display()))?;
    if removed {
        writeln!(out, "Removed {}", key.as_str())?;
    } else {
        writeln!(out, "{} was not set", key.as_str())?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::exit_code_from_error;
    use tempfile::TempDir;

    fn store() -> (TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join(".configs.ini"));
        (dir, store)
    }

    fn run_to_string(store: &ConfigStore, command: ConfigCommand) -> Result<String> {
        colored::control::set_override(false);
        let mut out = Vec::new();
        run(store, Some(command), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn keys_parse_loosely_and_reject_unknown_names() {
        assert_eq!(ConfigKey::parse("ADDRESS").unwrap(), ConfigKey::Address);
        assert_eq!(ConfigKey::parse("query-port").unwrap(), ConfigKey::QueryPort);

        let err = ConfigKey::parse("bucket").unwrap_err();
        assert!(err.to_string().contains("unknown setting 'bucket'"));
        assert_eq!(exit_code_from_error(&err), 2);
    }

    #[test]
    fn values_are_validated_per_key() {
        assert!(ConfigKey::Address.validate("10.0.0.5:8091").is_ok());
        assert!(ConfigKey::Address.validate("ftp://host").is_err());
        assert!(ConfigKey::Format.validate("CSV").is_ok());
        assert!(ConfigKey::Format.validate("yaml").is_err());
        assert!(ConfigKey::QueryPort.validate("18093").is_ok());
        assert!(ConfigKey::QueryPort.validate("0").is_err());
        assert!(ConfigKey::QueryPort.validate("http").is_err());
        assert!(ConfigKey::Scope.validate("travel-sample.inventory").is_ok());
        assert!(ConfigKey::Scope.validate("travel-sample").is_err());
        assert!(ConfigKey::Username.validate("  ").is_err());
    }

    #[test]
    fn set_then_get_masks_the_password() {
        let (_dir, store) = store();

        let set = run_to_string(
            &store,
            ConfigCommand::Set {
                key: "password".into(),
                value: "hunter2".into(),
            },
        )
        .unwrap();
        assert_eq!(set, "Set password = ********\n");
        assert_eq!(store.get(CLUSTER_SECTION, "password", ""), "hunter2");

        let got = run_to_string(&store, ConfigCommand::Get { key: "password".into() }).unwrap();
        assert_eq!(got, "********\n");
    }

    #[test]
    fn show_lists_every_key() {
        let (_dir, store) = store();
        store
            .set_many(CLUSTER_SECTION, &[("address", "10.0.0.5"), ("password", "pw")])
            .unwrap();

        let shown = run_to_string(&store, ConfigCommand::Show).unwrap();
        assert!(shown.contains("address     10.0.0.5"));
        assert!(shown.contains("password    ********"));
        assert!(shown.contains("username    not set"));
        assert!(!shown.contains("pw\n"));
    }

    #[test]
    fn unset_reports_whether_anything_was_removed() {
        let (_dir, store) = store();
        store.set(CLUSTER_SECTION, "scope", "b.s").unwrap();

        let first = run_to_string(&store, ConfigCommand::Unset { key: "scope".into() }).unwrap();
        let second = run_to_string(&store, ConfigCommand::Unset { key: "scope".into() }).unwrap();
        assert_eq!(first, "Removed scope\n");
        assert_eq!(second, "scope was not set\n");
    }

    #[test]
    fn invalid_set_leaves_the_file_untouched() {
        let (_dir, store) = store();
        let err = run_to_string(
            &store,
            ConfigCommand::Set {
                key: "format".into(),
                value: "xml".into(),
            },
        )
        .unwrap_err();
        assert_eq!(exit_code_from_error(&err), 2);
        assert!(!store.path().exists());
    }
}
