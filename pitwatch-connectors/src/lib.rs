//! Transport plumbing around the PitWatch engine
//!
//! ## Overview
//!
//! `pitwatch-core` decides when a channel alerts. This crate gets readings
//! to it and alerts away from it:
//!
//! ```text
//!  producer ──► broker topics ──► consumer ──► Ingestor ──► WindowManager
//!  (CSV replay)  01-smoker         (acks)        │
//!                02-food-A                       ▼
//!                03-food-B                 AlertDispatcher ──► AsyncAlertSink
//!                                          (bounded queue)     (log / MQTT)
//! ```
//!
//! ## Delivery Semantics
//!
//! The consumer subscribes at QoS 1 with manual acknowledgments, so a
//! reading is only released by the broker after the engine has seen it.
//! Payloads that can never be processed (malformed, or for a topic with no
//! channel) are logged and acknowledged anyway; redelivering them would not
//! help.
//!
//! Alerts are handed to the dispatcher with a non-blocking send. When the
//! sink falls behind and the queue is full, the alert is dropped and
//! counted rather than stalling ingestion.
//!
//! ## Example
//!
//! ```rust
//! use pitwatch_connectors::{Ingestor, MonitorConfig};
//!
//! let config = MonitorConfig::default();
//! let ingestor = Ingestor::new(&config)?;
//!
//! for payload in ["t0,100", "t1,98", "t2,90", "t3,84", "t4,83"] {
//!     if let Ok(Some(alert)) = ingestor.ingest("01-smoker", payload.as_bytes()) {
//!         println!("{}", alert.message);
//!     }
//! }
//! # Ok::<(), pitwatch_connectors::ConnectorError>(())
//! ```

pub mod config;
pub mod csv_replay;
pub mod dispatch;
pub mod ingest;

#[cfg(feature = "mqtt")]
pub mod mqtt;

// Re-export common types
pub use config::{AlertConfig, BrokerConfig, MonitorConfig, ProducerConfig, QueueConfig};
pub use csv_replay::{CsvReplay, ProducerRow};
pub use dispatch::{AlertDispatcher, AsyncAlertSink, CollectingSink, DispatchStats, LogAlertSink};
pub use ingest::Ingestor;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttAlertSink, MqttConsumer, MqttProducer};

use pitwatch_core::MonitorError;
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Engine error: {0}")]
    Monitor(MonitorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV error on line {line}: {reason}")]
    Csv { line: usize, reason: String },

    #[error("Alert queue closed")]
    QueueClosed,

    #[cfg(feature = "mqtt")]
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[cfg(feature = "mqtt")]
    #[error("MQTT connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
}

impl From<MonitorError> for ConnectorError {
    fn from(err: MonitorError) -> Self {
        ConnectorError::Monitor(err)
    }
}

/// Result alias for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;
