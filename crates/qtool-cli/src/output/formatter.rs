//! Format selection and dispatch.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use qtool_core::FlatRecord;
use serde_json::Value;

use super::{json::JsonFormatter, table::TableFormatter};

/// How query rows are written to stdout.
///
/// ```bash
/// # Aligned grid (default)
/// qtool execute -q "SELECT * FROM airline LIMIT 3"
///
/// # Spreadsheet-friendly
/// qtool execute -q "SELECT * FROM airline" -f csv > airlines.csv
///
/// # Streaming into jq
/// qtool execute -q "SELECT * FROM airline" -f jsonl | jq .name
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DisplayFormat {
    /// Aligned columns with a row index (default)
    #[default]
    Table,
    /// Comma-separated values with a row index
    Csv,
    /// Single JSON array
    Json,
    /// Newline-delimited JSON
    Jsonl,
}

impl DisplayFormat {
    /// Name used on the command line and in the settings file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }

    /// Parse a stored `format` setting (case-insensitive).
    #[must_use]
    pub fn from_setting(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value.trim(), true).ok()
    }

    /// Whether stdout must stay free of anything but the rows.
    #[must_use]
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json | Self::Jsonl)
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes a batch of flattened rows in one [`DisplayFormat`].
pub struct RowFormatter {
    format: DisplayFormat,
}

impl RowFormatter {
    /// Create a formatter for the given format.
    pub const fn new(format: DisplayFormat) -> Self {
        Self { format }
    }

    /// Write every row to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn format(&self, rows: &[FlatRecord], out: &mut dyn Write) -> Result<()> {
        match self.format {
            DisplayFormat::Table => TableFormatter::write_table(rows, out)?,
            DisplayFormat::Csv => TableFormatter::write_csv(rows, out)?,
            DisplayFormat::Json => JsonFormatter::write_array(rows, out)?,
            DisplayFormat::Jsonl => JsonFormatter::write_lines(rows, out)?,
        }
        out.flush()?;
        Ok(())
    }
}

/// Union of keys across `rows`, in first-seen order.
pub(super) fn columns(rows: &[FlatRecord]) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                ordered.push(key);
            }
        }
    }
    ordered
}

/// Text of one cell. Null and absent values are empty; nested values are
/// compact JSON.
pub(super) fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> FlatRecord {
        match value {
            Value::Object(map) => map,
            _ => FlatRecord::new(),
        }
    }

    #[test]
    fn columns_are_union_in_first_seen_order() {
        let rows = vec![
            record(json!({"b": 1, "a": 2})),
            record(json!({"c": 3, "a": 4})),
        ];
        assert_eq!(columns(&rows), vec!["b", "a", "c"]);
    }

    #[test]
    fn wide_rows_keep_every_column_once() {
        let wide: serde_json::Map<String, Value> =
            (0..2000).map(|i| (format!("col{i}"), json!(i))).collect();
        let rows = vec![wide.clone(), wide];

        let cols = columns(&rows);
        assert_eq!(cols.len(), 2000);
        assert_eq!(cols.first(), Some(&"col0"));
        assert_eq!(cols.last(), Some(&"col1999"));
    }

    #[test]
    fn cell_text_rules() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("Lyon"))), "Lyon");
        assert_eq!(cell_text(Some(&json!(4.5))), "4.5");
        assert_eq!(cell_text(Some(&json!(true))), "true");
        assert_eq!(cell_text(Some(&json!([1, "a"]))), "[1,\"a\"]");
    }

    #[test]
    fn stored_format_parses_case_insensitively() {
        assert_eq!(DisplayFormat::from_setting("CSV"), Some(DisplayFormat::Csv));
        assert_eq!(DisplayFormat::from_setting(" jsonl "), Some(DisplayFormat::Jsonl));
        assert_eq!(DisplayFormat::from_setting("yaml"), None);
    }

    #[test]
    fn json_output_round_trips_rows() {
        let rows = vec![record(json!({"a.b": 1, "c": null}))];
        let mut out = Vec::new();
        RowFormatter::new(DisplayFormat::Json)
            .format(&rows, &mut out)
            .unwrap();
        let parsed: Vec<FlatRecord> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, rows);
    }
}
