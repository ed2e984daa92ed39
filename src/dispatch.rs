// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channel-fed message dispatch.
//!
//! The bus transport is an external collaborator; it hands `(topic, payload)`
//! events to the pipeline through a bounded channel. The dispatcher is the
//! single consumer: every event is processed to completion before the next
//! one, which serializes all access to the snapshot and the throttle gate.

use crate::recorder::Recorder;
use tokio::sync::mpsc;

/// One inbound bus event.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Bus topic the payload was published on.
    pub topic: String,

    /// Raw payload bytes (decoded as UTF-8 text at the pipeline boundary).
    pub payload: Vec<u8>,
}

/// Single-consumer delivery loop feeding a [`Recorder`].
///
/// Mirrors a standalone subscriber: the transport side holds the sender and
/// pushes events; `run` drains them until every sender is dropped.
pub struct StandaloneDispatcher {
    recorder: Recorder,
    rx: mpsc::Receiver<InboundMessage>,
}

impl StandaloneDispatcher {
    /// Create a dispatcher around a recorder.
    ///
    /// Returns the dispatcher and the sender the transport pushes events
    /// into.
    pub fn new(recorder: Recorder) -> (Self, mpsc::Sender<InboundMessage>) {
        let (tx, rx) = mpsc::channel(1000);

        (Self { recorder, rx }, tx)
    }

    /// Run until all senders are dropped.
    ///
    /// Returns the recorder so the caller can inspect final statistics.
    pub async fn run(mut self) -> Recorder {
        tracing::info!("Dispatcher started");

        while let Some(msg) = self.rx.recv().await {
            self.recorder.handle_message(&msg.topic, &msg.payload);
        }

        let stats = self.recorder.stats();
        tracing::info!(
            "Dispatcher stopped: {} messages, {} records",
            stats.messages_received,
            stats.records_accepted
        );

        self.recorder
    }
}
