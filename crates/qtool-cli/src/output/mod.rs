//! # Output Formatting
//!
//! Renders flattened query rows for the terminal or for other programs.
//!
//! ## Supported Formats
//!
//! - **Table**: aligned columns with a leading row index (default)
//! - **CSV**: the same grid as comma-separated values
//! - **JSON**: one array of flat records
//! - **JSONL**: one flat record per line
//!
//! Every format shares the same column model: the union of keys across all
//! rows, in the order they were first seen. A row without a column renders an
//! empty cell (or omits the key in JSON).
//!
//! ```text
//!    airport.name  airport.geo.lat
//! -  ------------  ---------------
//! 0  Heathrow                51.47
//! 1  Gatwick                 51.15
//! ```

mod formatter;
mod json;
mod table;

pub use formatter::{DisplayFormat, RowFormatter};
