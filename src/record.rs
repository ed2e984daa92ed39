// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Materialized records.
//!
//! A [`Record`] is an immutable, field-ordered copy of the snapshot taken at
//! the instant a write is permitted. Two of the three sinks reconstruct
//! tabular structure (CSV header, XML tag names) directly from the field
//! names, so materialization must be deterministic across calls.

use crate::registry::{FieldRegistry, DEVICE_FIELD, TIME_FIELD};
use crate::snapshot::Snapshot;

/// Immutable ordered copy of a snapshot, destined for persistence.
///
/// Field order is fixed: registry fields in declaration order, then the
/// device identifier, then the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

/// Materialize a snapshot into a record.
///
/// Pure function of its inputs; the field set exactly matches the registry
/// columns plus the two synthetic fields.
pub fn materialize(snapshot: &Snapshot, registry: &FieldRegistry) -> Record {
    let mut fields = Vec::with_capacity(registry.columns().len());

    for field in registry.fields() {
        let value = snapshot.get(field).unwrap_or("0");
        fields.push((field.to_string(), value.to_string()));
    }
    fields.push((DEVICE_FIELD.to_string(), snapshot.device_id().to_string()));
    fields.push((TIME_FIELD.to_string(), snapshot.time().to_string()));

    Record { fields }
}

impl Record {
    /// Field names in materialization order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Value of a named field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// `(name, value)` pairs in materialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// JSON object with keys in materialization order.
    ///
    /// Relies on serde_json's `preserve_order` feature; without it the
    /// object would be re-sorted alphabetically.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            object.insert(name.clone(), serde_json::Value::String(value.clone()));
        }
        serde_json::Value::Object(object)
    }
}
