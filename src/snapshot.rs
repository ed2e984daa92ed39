// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory latest-value snapshot.
//!
//! Holds the most recently delivered value of every registered field plus
//! two synthetic fields: a constant device identifier and a last-update
//! timestamp. Every registered field has a value at all times (initialized
//! to `"0"`), so the snapshot is never partially undefined.

use crate::registry::FieldRegistry;
use std::collections::HashMap;

/// Timestamp format for the synthetic `time` field.
///
/// Human-readable and parseable, e.g. `2026-08-30 14:30:22.123456`.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Mutable latest-known-value state.
///
/// Owned exclusively by the pipeline; mutation is visible to subsequent
/// reads immediately. Payloads are stored as raw text with no validation;
/// numeric coercion is left to read-time consumers.
#[derive(Debug, Clone)]
pub struct Snapshot {
    values: HashMap<String, String>,
    device_id: String,
    time: String,
}

impl Snapshot {
    /// Create a snapshot with every registered field initialized to `"0"`.
    pub fn new(registry: &FieldRegistry, device_id: impl Into<String>) -> Self {
        let values = registry
            .fields()
            .map(|field| (field.to_string(), "0".to_string()))
            .collect();

        Self {
            values,
            device_id: device_id.into(),
            time: now_string(),
        }
    }

    /// Overwrite a tracked field's value and refresh the update timestamp.
    ///
    /// Updates for fields the registry never declared are ignored, keeping
    /// the field set exactly equal to the registry's.
    pub fn update(&mut self, field: &str, value: &str) {
        match self.values.get_mut(field) {
            Some(slot) => {
                *slot = value.to_string();
                self.time = now_string();
            }
            None => {
                tracing::debug!("Ignoring update for untracked field: {}", field);
            }
        }
    }

    /// Latest value of a field, if it is tracked.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Constant device identifier.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Wall-clock time of the most recent update.
    pub fn time(&self) -> &str {
        &self.time
    }
}

fn now_string() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}
