// SPDX-License-Identifier: Apache-2.0 OR MIT

//! sensorlog - throttled telemetry snapshot logger.
//!
//! Merges partial, out-of-order sensor field updates from a pub/sub bus into
//! a latest-value snapshot and appends that snapshot, at most once per
//! configured interval, to three append-only stores:
//!
//! - JSON: one pretty-printed array of record objects
//! - XML: one document with a flat `<item>` sequence under a `<data>` root
//! - CSV: one header row followed by one row per accepted snapshot
//!
//! # Architecture
//!
//! ```text
//! Recorder
//! +-- FieldRegistry  (topic -> field table, fixed column order)
//! +-- Snapshot       (latest value per field + device id + timestamp)
//! +-- WriteGate      (interval throttle, consume-on-pass)
//! +-- RecordSink[]   (JsonSink | XmlSink | CsvSink)
//! ```
//!
//! Each inbound `(topic, payload)` event is processed to completion: registry
//! lookup, snapshot mutation, throttle check, then materialize-and-append to
//! every sink when the gate passes. Bursts within the interval coalesce into
//! a single record carrying the latest value of every field.
//!
//! # Example
//!
//! ```no_run
//! use sensorlog::{Config, Recorder};
//!
//! # fn main() -> Result<(), sensorlog::RecorderError> {
//! let config = Config::builder()
//!     .topic("sensors/motion", "motion")
//!     .topic("sensors/temperature", "temperature")
//!     .write_interval_secs(5)
//!     .build();
//!
//! let mut recorder = Recorder::from_config(&config)?;
//! recorder.handle_message("sensors/temperature", b"21.5");
//! # Ok(())
//! # }
//! ```
//!
//! The bus transport itself is an external collaborator: the `sensorlog`
//! binary consumes `topic<TAB>payload` lines from stdin, and
//! [`StandaloneDispatcher`] accepts events over a channel for embedding.

pub mod config;
pub mod dispatch;
pub mod record;
pub mod recorder;
pub mod registry;
pub mod sink;
pub mod snapshot;
pub mod throttle;

pub use config::{Config, ConfigBuilder, TopicMapping};
pub use dispatch::{InboundMessage, StandaloneDispatcher};
pub use record::{materialize, Record};
pub use recorder::{Recorder, RecorderError, RecorderStats};
pub use registry::{FieldRegistry, RegistryError, DEVICE_FIELD, TIME_FIELD};
pub use sink::{CsvSink, JsonSink, RecordSink, SinkError, XmlSink};
pub use snapshot::Snapshot;
pub use throttle::{WriteGate, DEFAULT_WRITE_INTERVAL};
