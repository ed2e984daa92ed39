// SPDX-License-Identifier: Apache-2.0 OR MIT

//! XML element sink.
//!
//! The store is a single document: declaration, `<data>` root, and a flat
//! sequence of `<item>` elements with one child per record field. Appending
//! splices the new item immediately before the last occurrence of the
//! closing root tag, preserving everything before it byte-for-byte.
//!
//! If the closing tag cannot be found (corrupted or truncated store) the
//! sink rewrites a fresh document containing only the new item. Prior items
//! are lost in that path; this is a documented degraded mode, surfaced with
//! a warning, not silently hidden.

use super::{replace_file, RecordSink, SinkError};
use crate::record::Record;
use std::fs;
use std::path::{Path, PathBuf};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const ROOT_OPEN: &str = "<data>";
const ROOT_CLOSE: &str = "</data>";

/// Append sink backed by one XML document.
pub struct XmlSink {
    path: PathBuf,
}

impl XmlSink {
    /// Create a sink for the given store path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the store with an empty root container if it does not exist.
    pub fn ensure_store(&self) -> Result<(), SinkError> {
        if !self.path.exists() {
            let body = format!("{XML_DECLARATION}\n{ROOT_OPEN}\n{ROOT_CLOSE}\n");
            fs::write(&self.path, body)?;
        }
        Ok(())
    }

    fn serialize_item(record: &Record) -> String {
        let mut out = String::from("<item>");
        for (name, value) in record.iter() {
            let tag = tag_name(name);
            out.push('<');
            out.push_str(&tag);
            out.push('>');
            out.push_str(&escape_text(value));
            out.push_str("</");
            out.push_str(&tag);
            out.push('>');
        }
        out.push_str("</item>");
        out
    }
}

impl RecordSink for XmlSink {
    fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        self.ensure_store()?;

        let raw = fs::read(&self.path)?;
        let content = String::from_utf8_lossy(&raw);
        let item = Self::serialize_item(record);

        let body = match content.rfind(ROOT_CLOSE) {
            Some(pos) => {
                let mut body = String::with_capacity(content.len() + item.len() + 1);
                body.push_str(&content[..pos]);
                body.push_str(&item);
                body.push('\n');
                body.push_str(&content[pos..]);
                body
            }
            None => {
                tracing::warn!(
                    "XML store {} is missing its closing tag; rewriting (prior items lost)",
                    self.path.display()
                );
                format!("{XML_DECLARATION}\n{ROOT_OPEN}\n{item}\n{ROOT_CLOSE}\n")
            }
        };

        replace_file(&self.path, body.as_bytes())?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("xml store {}", self.path.display())
    }
}

/// Map a field name to a valid tag name (spaces become underscores).
fn tag_name(field: &str) -> String {
    field.replace(' ', "_")
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
