//! Flattening of nested query rows for tabular display.
//!
//! A row such as
//!
//! ```json
//! {"airline": {"name": "Delta", "country": "US"}, "id": 2009}
//! ```
//!
//! becomes
//!
//! ```json
//! {"airline.name": "Delta", "airline.country": "US", "id": 2009}
//! ```
//!
//! Rules:
//!
//! - Objects are expanded; every other value (including arrays and `null`)
//!   is a leaf kept under its full joined path.
//! - Empty objects contribute no keys.
//! - A non-object row is emitted under the empty key `""`.
//! - When two paths join to the same string, the one visited later wins.
//!   `{"a.b": 1, "a": {"b": 2}}` flattens to `{"a.b": 2}`. Collisions are not
//!   reported.

use serde_json::{Map, Value};

use crate::types::{FlatRecord, Record};

/// Default path separator.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Joins nested keys with a separator.
#[derive(Debug, Clone)]
pub struct Flattener {
    separator: String,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl Flattener {
    /// Create a flattener that joins path segments with `separator`.
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// The separator in use.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Flatten one record into a fresh mapping.
    pub fn flatten(&self, record: &Record) -> FlatRecord {
        let mut out = Map::new();
        self.flatten_into(&mut out, record);
        out
    }

    /// Flatten one record into `out`, overwriting any keys already present.
    pub fn flatten_into(&self, out: &mut FlatRecord, record: &Record) {
        let mut path = String::new();
        self.walk(out, &mut path, record);
    }

    /// Flatten every record.
    pub fn flatten_all<'a, I>(&self, records: I) -> Vec<FlatRecord>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records.into_iter().map(|r| self.flatten(r)).collect()
    }

    fn walk(&self, out: &mut FlatRecord, path: &mut String, value: &Value) {
        let Value::Object(map) = value else {
            out.insert(path.clone(), value.clone());
            return;
        };

        for (key, child) in map {
            let restore = path.len();
            if !path.is_empty() {
                path.push_str(&self.separator);
            }
            path.push_str(key);
            self.walk(out, path, child);
            path.truncate(restore);
        }
    }
}

/// Flatten with the default `.` separator.
pub fn flatten(record: &Record) -> FlatRecord {
    Flattener::default().flatten(record)
}
