// SPDX-License-Identifier: Apache-2.0 OR MIT

//! sensorlog CLI
//!
//! Reads `topic<TAB>payload` events from stdin (one per line) and logs
//! throttled snapshots to the JSON, XML, and CSV stores. The bus client
//! itself stays external; bridge its output in, e.g.:
//!
//! ```bash
//! # Log the default Wirenboard topic set
//! mqtt-bridge --host 192.168.1.23 | sensorlog
//!
//! # Custom mapping and interval
//! sensorlog --topic "sensors/temp=temperature" --interval 10 --csv /var/log/telemetry.csv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use sensorlog::{Config, InboundMessage, Recorder, StandaloneDispatcher, TopicMapping};
use std::io::BufRead;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sensorlog")]
#[command(about = "Throttled telemetry snapshot logger", long_about = None)]
#[command(version)]
struct Args {
    /// Broker host (device identifier derives from its last octet)
    #[arg(long, default_value = "192.168.1.23")]
    host: String,

    /// Broker port
    #[arg(long, default_value_t = 1883)]
    port: u16,

    /// Broker keep-alive in seconds
    #[arg(long, default_value_t = 60)]
    keepalive: u64,

    /// Minimum seconds between persisted snapshots
    #[arg(short, long, default_value_t = 5)]
    interval: u64,

    /// JSON store path
    #[arg(long, default_value = "data.json")]
    json: PathBuf,

    /// XML store path
    #[arg(long, default_value = "data.xml")]
    xml: PathBuf,

    /// CSV store path
    #[arg(long, default_value = "data.csv")]
    csv: PathBuf,

    /// Topic mapping "TOPIC=field" (repeatable; defaults to the Wirenboard set)
    #[arg(short, long = "topic")]
    topics: Vec<String>,

    /// Device identifier override
    #[arg(long)]
    device_id: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,
}

fn parse_topic_mapping(raw: &str) -> Result<TopicMapping> {
    let (topic, field) = raw
        .rsplit_once('=')
        .with_context(|| format!("Invalid topic mapping {raw:?}, expected \"TOPIC=field\""))?;
    Ok(TopicMapping::new(topic, field))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .init();

    let mut builder = Config::builder()
        .broker_host(&args.host)
        .broker_port(args.port)
        .keepalive_secs(args.keepalive)
        .write_interval_secs(args.interval)
        .json_path(&args.json)
        .xml_path(&args.xml)
        .csv_path(&args.csv);
    if !args.topics.is_empty() {
        let topics = args
            .topics
            .iter()
            .map(|raw| parse_topic_mapping(raw))
            .collect::<Result<Vec<_>>>()?;
        builder = builder.topics(topics);
    }
    if let Some(id) = &args.device_id {
        builder = builder.device_id(id);
    }
    let config = builder.build();

    if !args.quiet {
        info!("sensorlog v{}", env!("CARGO_PKG_VERSION"));
        info!("  Broker: {}:{}", config.broker_host, config.broker_port);
        info!("  Device: {}", config.resolved_device_id());
        info!("  Interval: {}s", config.write_interval_secs);
        info!("  Stores: {} | {} | {}",
            config.json_path.display(),
            config.xml_path.display(),
            config.csv_path.display()
        );
        for mapping in &config.topics {
            info!("  Topic: {} -> {}", mapping.topic, mapping.field);
        }
    }

    let recorder = Recorder::from_config(&config)?;
    let (dispatcher, tx) = StandaloneDispatcher::new(recorder);

    // Blocking stdin feed; EOF drops the sender and stops the dispatcher.
    std::thread::spawn(move || feed_stdin(tx));

    let recorder = tokio::select! {
        recorder = dispatcher.run() => Some(recorder),
        _ = tokio::signal::ctrl_c() => None,
    };

    match recorder {
        Some(recorder) => {
            let stats = recorder.stats();
            if !args.quiet {
                info!("Input exhausted");
                info!("  Messages: {}", stats.messages_received);
                info!("  Dropped: {}", stats.messages_dropped);
                info!("  Records: {}", stats.records_accepted);
                if stats.append_errors > 0 {
                    info!("  Append errors: {}", stats.append_errors);
                }
            }
        }
        None => info!("Interrupted"),
    }

    Ok(())
}

/// Forward `topic<TAB>payload` stdin lines into the dispatcher channel.
fn feed_stdin(tx: mpsc::Sender<InboundMessage>) {
    let stdin = std::io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.is_empty() {
            continue;
        }

        let Some((topic, payload)) = line.split_once('\t') else {
            warn!("Ignoring malformed input line (expected topic<TAB>payload)");
            continue;
        };

        let msg = InboundMessage {
            topic: topic.to_string(),
            payload: payload.as_bytes().to_vec(),
        };
        if tx.blocking_send(msg).is_err() {
            break;
        }
    }
}
