// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshot recorder.
//!
//! The pipeline behind every inbound message: registry lookup, snapshot
//! mutation, throttle check, then materialize-and-append to every sink when
//! the gate passes. One logical thread of control drives it; the snapshot
//! and the gate are unsynchronized by design.

use crate::config::Config;
use crate::record::{materialize, Record};
use crate::registry::{FieldRegistry, RegistryError, TIME_FIELD};
use crate::sink::{CsvSink, JsonSink, RecordSink, SinkError, XmlSink};
use crate::snapshot::Snapshot;
use crate::throttle::WriteGate;
use std::time::Instant;
use thiserror::Error;

/// Recorder errors.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Pipeline statistics.
#[derive(Debug, Clone, Default)]
pub struct RecorderStats {
    /// Total messages delivered to the pipeline.
    pub messages_received: u64,

    /// Messages dropped because their topic is not registered.
    pub messages_dropped: u64,

    /// Snapshots accepted by the throttle gate.
    pub records_accepted: u64,

    /// Failed append attempts (per sink, not retried).
    pub append_errors: u64,
}

/// Telemetry snapshot recorder.
///
/// Owns the snapshot state, the throttle gate, and the append sinks.
pub struct Recorder {
    registry: FieldRegistry,
    snapshot: Snapshot,
    gate: WriteGate,
    sinks: Vec<Box<dyn RecordSink>>,
    stats: RecorderStats,
}

impl Recorder {
    /// Create a recorder with no sinks attached.
    pub fn new(config: &Config) -> Result<Self, RecorderError> {
        let registry = FieldRegistry::new(config.topics.clone())?;
        let snapshot = Snapshot::new(&registry, config.resolved_device_id());
        let gate = WriteGate::new(config.write_interval());

        Ok(Self {
            registry,
            snapshot,
            gate,
            sinks: Vec::new(),
            stats: RecorderStats::default(),
        })
    }

    /// Create a recorder with the standard JSON, XML, and CSV sinks at the
    /// configured store paths. The XML store is initialized up front so it
    /// always holds a valid document.
    pub fn from_config(config: &Config) -> Result<Self, RecorderError> {
        let mut recorder = Self::new(config)?;

        let xml = XmlSink::new(&config.xml_path);
        xml.ensure_store()?;

        recorder.add_sink(Box::new(JsonSink::new(&config.json_path)));
        recorder.add_sink(Box::new(xml));
        recorder.add_sink(Box::new(CsvSink::new(&config.csv_path)));

        Ok(recorder)
    }

    /// Attach a sink.
    pub fn add_sink(&mut self, sink: Box<dyn RecordSink>) {
        self.sinks.push(sink);
    }

    /// Process one inbound `(topic, payload)` event to completion.
    ///
    /// Payload is treated as UTF-8 text. Events for unregistered topics are
    /// dropped without error.
    pub fn handle_message(&mut self, topic: &str, payload: &[u8]) {
        self.handle_message_at(Instant::now(), topic, payload);
    }

    /// [`handle_message`](Self::handle_message) with an explicit event clock,
    /// for deterministic throttle behavior in tests.
    pub fn handle_message_at(&mut self, now: Instant, topic: &str, payload: &[u8]) {
        self.stats.messages_received += 1;

        let Some(field) = self.registry.resolve(topic) else {
            self.stats.messages_dropped += 1;
            tracing::trace!("Dropping message for unregistered topic: {}", topic);
            return;
        };

        let value = String::from_utf8_lossy(payload);
        self.snapshot.update(field, &value);

        if !self.gate.should_write(now) {
            return;
        }

        let record = materialize(&self.snapshot, &self.registry);
        self.stats.records_accepted += 1;
        self.append_to_sinks(&record);
    }

    /// Append one record to every sink.
    ///
    /// A failed append is reported and counted, the remaining sinks still
    /// run, and the record is not retried (at most one attempt per accepted
    /// snapshot).
    fn append_to_sinks(&mut self, record: &Record) {
        for sink in &mut self.sinks {
            match sink.append(record) {
                Ok(()) => {
                    tracing::trace!("Appended record to {}", sink.describe());
                }
                Err(e) => {
                    self.stats.append_errors += 1;
                    tracing::error!("Failed to append to {}: {}", sink.describe(), e);
                }
            }
        }

        tracing::debug!(
            "Persisted snapshot at {}",
            record.get(TIME_FIELD).unwrap_or("?")
        );
    }

    /// Current pipeline statistics.
    pub fn stats(&self) -> &RecorderStats {
        &self.stats
    }

    /// Current snapshot state.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The topic-to-field registry.
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Sink that collects records in memory.
    struct CollectingSink {
        records: Rc<RefCell<Vec<Record>>>,
    }

    /// Sink that always fails.
    struct FailingSink;

    impl RecordSink for CollectingSink {
        fn append(&mut self, record: &Record) -> Result<(), SinkError> {
            self.records.borrow_mut().push(record.clone());
            Ok(())
        }

        fn describe(&self) -> String {
            "collecting sink".to_string()
        }
    }

    impl RecordSink for FailingSink {
        fn append(&mut self, _record: &Record) -> Result<(), SinkError> {
            Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        }

        fn describe(&self) -> String {
            "failing sink".to_string()
        }
    }

    fn test_config() -> Config {
        Config::builder()
            .broker_host("192.168.1.23")
            .topic("T1", "motion")
            .topic("T2", "temperature")
            .write_interval_secs(5)
            .build()
    }

    fn recorder_with_collector(config: &Config) -> (Recorder, Rc<RefCell<Vec<Record>>>) {
        let records = Rc::new(RefCell::new(Vec::new()));
        let mut recorder = Recorder::new(config).expect("recorder");
        recorder.add_sink(Box::new(CollectingSink {
            records: Rc::clone(&records),
        }));
        (recorder, records)
    }

    #[test]
    fn test_first_update_always_writes() {
        let config = test_config();
        let (mut recorder, records) = recorder_with_collector(&config);

        recorder.handle_message_at(Instant::now(), "T1", b"1");

        assert_eq!(records.borrow().len(), 1);
        assert_eq!(recorder.stats().records_accepted, 1);
    }

    #[test]
    fn test_burst_coalesces_to_last_values() {
        let config = test_config();
        let (mut recorder, records) = recorder_with_collector(&config);
        let t0 = Instant::now();

        recorder.handle_message_at(t0, "T1", b"1");
        recorder.handle_message_at(t0 + Duration::from_secs(1), "T2", b"21.5");
        recorder.handle_message_at(t0 + Duration::from_secs(2), "T1", b"0");
        recorder.handle_message_at(t0 + Duration::from_secs(6), "T2", b"21.5");

        let records = records.borrow();
        assert_eq!(records.len(), 2);
        // The second record carries the last value of every field.
        assert_eq!(records[1].get("motion"), Some("0"));
        assert_eq!(records[1].get("temperature"), Some("21.5"));
    }

    #[test]
    fn test_unregistered_topic_dropped() {
        let config = test_config();
        let (mut recorder, records) = recorder_with_collector(&config);

        recorder.handle_message_at(Instant::now(), "T9", b"42");

        assert_eq!(records.borrow().len(), 0);
        assert_eq!(recorder.stats().messages_dropped, 1);
        // No state change either.
        assert_eq!(recorder.snapshot().get("motion"), Some("0"));
    }

    #[test]
    fn test_sink_failure_does_not_stop_pipeline() {
        let config = test_config();
        let records = Rc::new(RefCell::new(Vec::new()));
        let mut recorder = Recorder::new(&config).expect("recorder");
        recorder.add_sink(Box::new(FailingSink));
        recorder.add_sink(Box::new(CollectingSink {
            records: Rc::clone(&records),
        }));
        let t0 = Instant::now();

        recorder.handle_message_at(t0, "T1", b"1");
        recorder.handle_message_at(t0 + Duration::from_secs(5), "T1", b"0");

        // The healthy sink saw both records; the failures were counted.
        assert_eq!(records.borrow().len(), 2);
        assert_eq!(recorder.stats().append_errors, 2);
        assert_eq!(recorder.stats().records_accepted, 2);
    }

    #[test]
    fn test_non_utf8_payload_stored_lossily() {
        let config = test_config();
        let (mut recorder, records) = recorder_with_collector(&config);

        recorder.handle_message_at(Instant::now(), "T1", &[0xff, 0x31]);

        let records = records.borrow();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("motion"), Some("\u{fffd}1"));
    }
}
