// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logger configuration.
//!
//! Carries the bus connection parameters (consumed by the external
//! transport), the topic-to-field table, the throttle interval, and the
//! store paths. Defaults reproduce the original Wirenboard deployment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One topic-to-field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMapping {
    /// External bus topic.
    pub topic: String,

    /// Internal field name (also the persisted column name).
    pub field: String,
}

impl TopicMapping {
    /// Create a mapping.
    pub fn new(topic: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            field: field.into(),
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bus broker host.
    pub broker_host: String,

    /// Bus broker port.
    pub broker_port: u16,

    /// Bus keep-alive in seconds.
    pub keepalive_secs: u64,

    /// Minimum wall-clock spacing between accepted writes, in seconds.
    pub write_interval_secs: u64,

    /// JSON store path.
    pub json_path: PathBuf,

    /// XML store path.
    pub xml_path: PathBuf,

    /// CSV store path.
    pub csv_path: PathBuf,

    /// Topic-to-field table, in column order.
    pub topics: Vec<TopicMapping>,

    /// Device identifier override. When unset the identifier is the last
    /// dot-separated octet of the broker host.
    pub device_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker_host: "192.168.1.23".to_string(),
            broker_port: 1883,
            keepalive_secs: 60,
            write_interval_secs: 5,
            json_path: PathBuf::from("data.json"),
            xml_path: PathBuf::from("data.xml"),
            csv_path: PathBuf::from("data.csv"),
            topics: vec![
                TopicMapping::new("/devices/wb-msw-v3_64/controls/Current Motion", "motion"),
                TopicMapping::new("/devices/wb-msw-v3_64/controls/Temperature", "temperature"),
                TopicMapping::new("/devices/wb-map12e_35/controls/Ch 3 Q L1", "voltage vent"),
            ],
            device_id: None,
        }
    }
}

impl Config {
    /// Create a new config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Throttle interval as a `Duration`.
    pub fn write_interval(&self) -> Duration {
        Duration::from_secs(self.write_interval_secs)
    }

    /// Device identifier: the configured value, or the last dot-separated
    /// octet of the broker host.
    pub fn resolved_device_id(&self) -> String {
        match &self.device_id {
            Some(id) => id.clone(),
            None => self
                .broker_host
                .rsplit('.')
                .next()
                .unwrap_or(&self.broker_host)
                .to_string(),
        }
    }
}

/// Config builder for fluent API.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    broker_host: Option<String>,
    broker_port: Option<u16>,
    keepalive_secs: Option<u64>,
    write_interval_secs: Option<u64>,
    json_path: Option<PathBuf>,
    xml_path: Option<PathBuf>,
    csv_path: Option<PathBuf>,
    topics: Vec<TopicMapping>,
    device_id: Option<String>,
}

impl ConfigBuilder {
    /// Set the broker host.
    pub fn broker_host(mut self, host: impl Into<String>) -> Self {
        self.broker_host = Some(host.into());
        self
    }

    /// Set the broker port.
    pub fn broker_port(mut self, port: u16) -> Self {
        self.broker_port = Some(port);
        self
    }

    /// Set the keep-alive in seconds.
    pub fn keepalive_secs(mut self, secs: u64) -> Self {
        self.keepalive_secs = Some(secs);
        self
    }

    /// Set the throttle interval in seconds.
    pub fn write_interval_secs(mut self, secs: u64) -> Self {
        self.write_interval_secs = Some(secs);
        self
    }

    /// Set the JSON store path.
    pub fn json_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_path = Some(path.into());
        self
    }

    /// Set the XML store path.
    pub fn xml_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.xml_path = Some(path.into());
        self
    }

    /// Set the CSV store path.
    pub fn csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_path = Some(path.into());
        self
    }

    /// Add one topic-to-field mapping.
    pub fn topic(mut self, topic: impl Into<String>, field: impl Into<String>) -> Self {
        self.topics.push(TopicMapping::new(topic, field));
        self
    }

    /// Replace the whole topic table.
    pub fn topics(mut self, topics: Vec<TopicMapping>) -> Self {
        self.topics = topics;
        self
    }

    /// Set the device identifier.
    pub fn device_id(mut self, id: impl Into<String>) -> Self {
        self.device_id = Some(id.into());
        self
    }

    /// Build the configuration.
    ///
    /// An empty topic table falls back to the default mapping set.
    pub fn build(self) -> Config {
        let defaults = Config::default();

        Config {
            broker_host: self.broker_host.unwrap_or(defaults.broker_host),
            broker_port: self.broker_port.unwrap_or(defaults.broker_port),
            keepalive_secs: self.keepalive_secs.unwrap_or(defaults.keepalive_secs),
            write_interval_secs: self
                .write_interval_secs
                .unwrap_or(defaults.write_interval_secs),
            json_path: self.json_path.unwrap_or(defaults.json_path),
            xml_path: self.xml_path.unwrap_or(defaults.xml_path),
            csv_path: self.csv_path.unwrap_or(defaults.csv_path),
            topics: if self.topics.is_empty() {
                defaults.topics
            } else {
                self.topics
            },
            device_id: self.device_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.broker_host, "192.168.1.23");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.write_interval_secs, 5);
        assert_eq!(config.topics.len(), 3);
        assert_eq!(config.topics[0].field, "motion");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .broker_host("10.0.0.7")
            .broker_port(1884)
            .write_interval_secs(10)
            .topic("sensors/motion", "motion")
            .json_path("/tmp/out.json")
            .build();

        assert_eq!(config.broker_host, "10.0.0.7");
        assert_eq!(config.broker_port, 1884);
        assert_eq!(config.write_interval(), Duration::from_secs(10));
        assert_eq!(config.topics.len(), 1);
        assert_eq!(config.json_path, PathBuf::from("/tmp/out.json"));
    }

    #[test]
    fn test_device_id_from_host_octet() {
        let config = Config::builder().broker_host("192.168.1.23").build();

        assert_eq!(config.resolved_device_id(), "23");
    }

    #[test]
    fn test_device_id_override() {
        let config = Config::builder()
            .broker_host("192.168.1.23")
            .device_id("suitcase-7")
            .build();

        assert_eq!(config.resolved_device_id(), "suitcase-7");
    }
}
