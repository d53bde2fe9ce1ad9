//! JSON output formatting

use std::io::{self, Write};

use qtool_core::FlatRecord;

pub struct JsonFormatter;

impl JsonFormatter {
    /// Write all rows as one pretty-printed JSON array.
    pub fn write_array(rows: &[FlatRecord], out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, rows)?;
        writeln!(out)
    }

    /// Write each row as a compact JSON object on its own line.
    pub fn write_lines(rows: &[FlatRecord], out: &mut dyn Write) -> io::Result<()> {
        for row in rows {
            serde_json::to_writer(&mut *out, row)?;
            writeln!(out)?;
        }
        Ok(())
    }
}
