//! Minimal INI document model used by the settings store.
//!
//! Accepted input:
//!
//! ```text
//! ; comment
//! [CLUSTER]
//! address=127.0.0.1:8091
//! username = Administrator
//! format: table
//! ```
//!
//! Section names are case-sensitive. Keys are normalized to lower case.
//! Output always uses `key=value` with no spaces around the delimiter and a
//! blank line after each section.
//!
//! Values are trimmed when read, and there are no continuation lines, so
//! [`IniDocument::set`] refuses anything that would not read back unchanged:
//! line breaks anywhere, surrounding whitespace, and delimiters or comment
//! markers inside a key.

use crate::{Error, Result};

/// One `[NAME]` block and its entries, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Section name as written in the header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: String, value: String) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }
}

/// An ordered collection of INI sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text.
    ///
    /// Duplicate keys within a section keep the last value. A section header
    /// that appears twice merges into the first occurrence.
    pub fn parse(input: &str) -> Result<Self> {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| Error::Parse {
                    line: line_no,
                    message: format!("unterminated section header '{line}'"),
                })?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::Parse {
                        line: line_no,
                        message: "empty section name".to_string(),
                    });
                }
                current = Some(doc.section_index_or_insert(name));
                continue;
            }

            let Some(section_idx) = current else {
                return Err(Error::Parse {
                    line: line_no,
                    message: format!("option '{line}' appears before any section header"),
                });
            };

            let (key, value) = split_option(line).ok_or_else(|| Error::Parse {
                line: line_no,
                message: format!("expected 'key=value', found '{line}'"),
            })?;
            if key.is_empty() {
                return Err(Error::Parse {
                    line: line_no,
                    message: "empty option name".to_string(),
                });
            }

            doc.sections[section_idx].set(normalize_key(key), value.to_string());
        }

        Ok(doc)
    }

    /// Look up a value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(&normalize_key(key))
    }

    /// Insert or overwrite a value, creating the section if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the section, key, or value could not be
    /// written and parsed back unchanged.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        check_entry(section, key, value)?;
        let idx = self.section_index_or_insert(section);
        self.sections[idx].set(normalize_key(key), value.to_string());
        Ok(())
    }

    /// Remove a value. Sections left empty are dropped.
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        let Some(idx) = self.sections.iter().position(|s| s.name == section) else {
            return false;
        };
        let removed = self.sections[idx].remove(&normalize_key(key));
        if self.sections[idx].entries.is_empty() {
            self.sections.remove(idx);
        }
        removed
    }

    /// Find a section by name.
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// All sections in file order.
    pub fn sections(&self) -> &[IniSection] {
        &self.sections
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self.sections.iter().position(|s| s.name == name) {
            idx
        } else {
            self.sections.push(IniSection::new(name));
            self.sections.len() - 1
        }
    }
}

impl std::fmt::Display for IniDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{key}={value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn split_option(line: &str) -> Option<(&str, &str)> {
    // Whichever delimiter comes first wins, so values may contain the other.
    let pos = line.find(['=', ':'])?;
    let (key, rest) = line.split_at(pos);
    Some((key.trim(), rest[1..].trim()))
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// Reject a section, key, or value that would not survive a write and a
/// re-read.
pub fn check_entry(section: &str, key: &str, value: &str) -> Result<()> {
    let has_line_break = |s: &str| s.contains(['\n', '\r']);
    let padded = |s: &str| s.trim() != s;

    if section.is_empty() || padded(section) || has_line_break(section) || section.contains(']') {
        return Err(Error::Config(format!(
            "section name '{}' cannot be stored",
            section.escape_debug()
        )));
    }
    if key.is_empty()
        || padded(key)
        || has_line_break(key)
        || key.contains(['=', ':'])
        || key.starts_with(['[', '#', ';'])
    {
        return Err(Error::Config(format!(
            "setting name '{}' cannot be stored; names must not be blank, \
             start with '[', '#' or ';', or contain '=', ':' or line breaks",
            key.escape_debug()
        )));
    }
    if has_line_break(value) {
        return Err(Error::Config(format!(
            "value for '{key}' contains a line break, which the settings file cannot hold"
        )));
    }
    if padded(value) {
        return Err(Error::Config(format!(
            "value for '{key}' has leading or trailing whitespace, which the settings file cannot keep"
        )));
    }
    Ok(())
}
