//! Grid output: the aligned table and CSV.

use std::io::{self, Write};

use qtool_core::FlatRecord;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use super::formatter::{cell_text, columns};

const COLUMN_GAP: &str = "  ";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

pub struct TableFormatter;

impl TableFormatter {
    /// Write rows as an aligned grid with a leading index column.
    ///
    /// Columns holding only numbers are right-aligned. Nothing is written
    /// for an empty result.
    pub fn write_table(rows: &[FlatRecord], out: &mut dyn Write) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let columns = columns(rows);
        let mut header = Vec::with_capacity(columns.len() + 1);
        header.push(String::new());
        header.extend(columns.iter().map(|c| table_safe(c)));

        let body: Vec<Vec<String>> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let mut cells = Vec::with_capacity(columns.len() + 1);
                cells.push(index.to_string());
                cells.extend(
                    columns
                        .iter()
                        .map(|c| table_safe(&cell_text(row.get(*c)))),
                );
                cells
            })
            .collect();

        let mut align = vec![Align::Right];
        align.extend(columns.iter().map(|c| {
            if is_numeric_column(rows, c) {
                Align::Right
            } else {
                Align::Left
            }
        }));

        let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.width());
            }
        }
        for width in &mut widths {
            *width = (*width).max(1);
        }

        write_line(out, &header, &widths, &align)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(out, &rule, &widths, &align)?;
        for cells in &body {
            write_line(out, cells, &widths, &align)?;
        }
        Ok(())
    }

    /// Write rows as CSV: an empty header cell for the index, then one
    /// header per column. Fields are quoted per RFC 4180.
    pub fn write_csv(rows: &[FlatRecord], out: &mut dyn Write) -> io::Result<()> {
        let columns = columns(rows);

        let mut header = vec![String::new()];
        header.extend(columns.iter().map(|c| csv_field(c)));
        writeln!(out, "{}", header.join(","))?;

        for (index, row) in rows.iter().enumerate() {
            let mut fields = vec![index.to_string()];
            fields.extend(columns.iter().map(|c| csv_field(&cell_text(row.get(*c)))));
            writeln!(out, "{}", fields.join(","))?;
        }
        Ok(())
    }
}

fn write_line(
    out: &mut dyn Write,
    cells: &[String],
    widths: &[usize],
    align: &[Align],
) -> io::Result<()> {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        let fill = widths[i].saturating_sub(cell.width());
        if align[i] == Align::Right {
            line.push_str(&" ".repeat(fill));
            line.push_str(cell);
        } else {
            line.push_str(cell);
            line.push_str(&" ".repeat(fill));
        }
    }
    writeln!(out, "{}", line.trim_end())
}

/// A column is numeric when every present, non-null value is a number.
fn is_numeric_column(rows: &[FlatRecord], column: &str) -> bool {
    let mut saw_number = false;
    for value in rows.iter().filter_map(|row| row.get(column)) {
        match value {
            Value::Number(_) => saw_number = true,
            Value::Null => {},
            _ => return false,
        }
    }
    saw_number
}

/// Keep each cell on one line.
fn table_safe(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n").replace('\t', " ")
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
