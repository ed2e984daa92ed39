// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSV row sink.
//!
//! The store is a single CSV file: one header row naming every column in the
//! record's fixed order, then one data row per accepted snapshot. The header
//! is written whenever the file is missing or empty, and never rewritten or
//! duplicated once present: a restarted sink appends data rows to an
//! established store.

use super::{RecordSink, SinkError};
use crate::record::Record;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append sink backed by one CSV file.
pub struct CsvSink {
    path: PathBuf,
    /// Column order captured from the first appended record; later rows are
    /// rendered against it, missing fields as empty cells.
    columns: Option<Vec<String>>,
}

impl CsvSink {
    /// Create a sink for the given store path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            columns: None,
        }
    }

    /// Store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_has_content(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() > 0).unwrap_or(false)
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        // The file alone decides: a fresh sink over an established store
        // must not repeat the header.
        let need_header = !self.file_has_content();

        let columns = self
            .columns
            .get_or_insert_with(|| record.columns().map(str::to_string).collect());

        let mut out = String::new();
        if need_header {
            out.push_str(&format_row(columns.iter().map(String::as_str)));
            out.push('\n');
        }
        out.push_str(&format_row(
            columns.iter().map(|c| record.get(c).unwrap_or("")),
        ));
        out.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(out.as_bytes())?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("csv store {}", self.path.display())
    }
}

fn format_row<'a, I: IntoIterator<Item = &'a str>>(cells: I) -> String {
    cells
        .into_iter()
        .map(quote_cell)
        .collect::<Vec<_>>()
        .join(",")
}

/// Minimal quoting: only cells containing a delimiter, quote, or line break
/// are quoted, with embedded quotes doubled.
fn quote_cell(cell: &str) -> String {
    if cell.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
