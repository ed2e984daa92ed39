// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topic-to-field registry.
//!
//! Maps external bus topics to internal field names and fixes the column
//! order that every sink derives its tabular structure from.

use crate::config::TopicMapping;
use std::collections::HashSet;
use thiserror::Error;

/// Synthetic column holding the device identifier.
pub const DEVICE_FIELD: &str = "number";

/// Synthetic column holding the last-update timestamp.
pub const TIME_FIELD: &str = "time";

/// Registry construction errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Field name is reserved: {0}")]
    ReservedField(String),
}

/// Immutable topic-to-field table.
///
/// Built once from configuration at startup. Declaration order is the column
/// order of every persisted record (registry fields, then device id, then
/// timestamp).
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    mappings: Vec<TopicMapping>,
    columns: Vec<String>,
}

impl FieldRegistry {
    /// Create a registry from an ordered mapping table.
    ///
    /// Field names must be unique and must not collide with the synthetic
    /// `number`/`time` columns.
    pub fn new(mappings: Vec<TopicMapping>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for mapping in &mappings {
            if mapping.field == DEVICE_FIELD || mapping.field == TIME_FIELD {
                return Err(RegistryError::ReservedField(mapping.field.clone()));
            }
            if !seen.insert(mapping.field.as_str()) {
                return Err(RegistryError::DuplicateField(mapping.field.clone()));
            }
        }

        let mut columns: Vec<String> = mappings.iter().map(|m| m.field.clone()).collect();
        columns.push(DEVICE_FIELD.to_string());
        columns.push(TIME_FIELD.to_string());

        Ok(Self { mappings, columns })
    }

    /// Resolve a bus topic to its internal field name.
    ///
    /// Unknown topics return `None`; the caller drops the event rather than
    /// fail.
    pub fn resolve(&self, topic: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.topic == topic)
            .map(|m| m.field.as_str())
    }

    /// Registered field names in declaration order (synthetic columns
    /// excluded).
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|m| m.field.as_str())
    }

    /// Full record column set: registry fields in declaration order, then
    /// `number`, then `time`.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings() -> Vec<TopicMapping> {
        vec![
            TopicMapping::new("/devices/msw/controls/Current Motion", "motion"),
            TopicMapping::new("/devices/msw/controls/Temperature", "temperature"),
        ]
    }

    #[test]
    fn test_resolve_known_topic() {
        let registry = FieldRegistry::new(mappings()).expect("registry");

        assert_eq!(
            registry.resolve("/devices/msw/controls/Temperature"),
            Some("temperature")
        );
    }

    #[test]
    fn test_resolve_unknown_topic() {
        let registry = FieldRegistry::new(mappings()).expect("registry");

        assert_eq!(registry.resolve("/devices/other/controls/Humidity"), None);
    }

    #[test]
    fn test_columns_order() {
        let registry = FieldRegistry::new(mappings()).expect("registry");

        assert_eq!(
            registry.columns(),
            &["motion", "temperature", "number", "time"]
        );
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mappings = vec![
            TopicMapping::new("a/topic", "motion"),
            TopicMapping::new("b/topic", "motion"),
        ];

        assert!(matches!(
            FieldRegistry::new(mappings),
            Err(RegistryError::DuplicateField(_))
        ));
    }

    #[test]
    fn test_reserved_field_rejected() {
        let mappings = vec![TopicMapping::new("a/topic", "time")];

        assert!(matches!(
            FieldRegistry::new(mappings),
            Err(RegistryError::ReservedField(_))
        ));
    }
}
