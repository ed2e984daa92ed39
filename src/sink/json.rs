// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON array sink.
//!
//! The store is a single pretty-printed JSON array of record objects.
//! Appending reads the whole array, pushes the new record, and rewrites the
//! file atomically. Cost is O(total records) per append, which is acceptable
//! at one write per throttle interval.

use super::{replace_file, RecordSink, SinkError};
use crate::record::Record;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Append sink backed by one JSON array file.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    /// Create a sink for the given store path. The file is created on the
    /// first append.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load existing entries.
    ///
    /// A missing file is an empty array. An unparseable file is also treated
    /// as an empty array: the next append overwrites it with a freshly valid
    /// document, losing the unreadable content (destructive recovery).
    fn load_entries(&self) -> Result<Vec<serde_json::Value>, SinkError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    "JSON store {} is unparseable ({}); discarding existing content",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }
}

impl RecordSink for JsonSink {
    fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        let mut entries = self.load_entries()?;
        entries.push(record.to_json());

        let body = to_pretty(&entries)?;
        replace_file(&self.path, &body)?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("json store {}", self.path.display())
    }
}

/// Serialize with 4-space indentation, non-ASCII characters written raw.
fn to_pretty(entries: &[serde_json::Value]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}
