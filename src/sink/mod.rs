// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Append sinks.
//!
//! Each sink durably extends one on-disk store with one materialized record.
//! After every successful append the store is a structurally valid document
//! of its format; rewrites go through a sibling temp file and rename so a
//! partial write is never visible as valid content.

pub mod csv;
pub mod json;
pub mod xml;

pub use csv::CsvSink;
pub use json::JsonSink;
pub use xml::XmlSink;

use crate::record::Record;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sink errors.
///
/// An error is fatal to the one append attempt that produced it; the record
/// is not retried or queued.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A component that durably extends one on-disk store with one new record.
pub trait RecordSink {
    /// Append one record to the backing store.
    fn append(&mut self, record: &Record) -> Result<(), SinkError>;

    /// Short description for logging, e.g. `json store data.json`.
    fn describe(&self) -> String;
}

/// Atomically replace `path` with `contents` via a sibling temp file.
pub(crate) fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_replace_file_leaves_no_temp() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("store.json");

        replace_file(&path, b"[]").expect("replace");

        assert_eq!(fs::read(&path).expect("read"), b"[]");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_replace_file_overwrites() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("store.json");

        replace_file(&path, b"old").expect("replace");
        replace_file(&path, b"new").expect("replace");

        assert_eq!(fs::read(&path).expect("read"), b"new");
    }
}
