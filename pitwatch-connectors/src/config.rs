//! Monitor configuration
//!
//! Everything is optional. A missing file section, or a missing field
//! inside one, falls back to the stock rig:
//!
//! ```json
//! {
//!   "broker": { "host": "pit.local", "port": 1883 },
//!   "channels": { "food_b": null },
//!   "alerts": { "publish_topic": "pitwatch/alerts" }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use pitwatch_core::constants::{FOOD_A_TOPIC, FOOD_B_TOPIC, READING_INTERVAL_SECS, SMOKER_TOPIC};
use pitwatch_core::{ChannelId, ChannelTable};
use serde::{Deserialize, Serialize};

use crate::{ConnectorError, ConnectorResult};

/// rumqttc refuses keep-alives shorter than this
const MIN_KEEP_ALIVE_SECS: u64 = 5;

/// Full configuration for the monitor and producer binaries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Broker connection
    pub broker: BrokerConfig,
    /// Topic per channel
    pub queues: QueueConfig,
    /// Window and predicate per channel
    pub channels: ChannelTable,
    /// Alert delivery
    pub alerts: AlertConfig,
    /// CSV replay settings
    pub producer: ProducerConfig,
}

impl MonitorConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> ConnectorResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the whole configuration
    pub fn validate(&self) -> ConnectorResult<()> {
        self.channels.validate()?;
        self.broker.validate()?;
        self.queues.validate()?;

        if self.alerts.queue_capacity == 0 {
            return Err(ConnectorError::ConfigError(
                "alerts.queue_capacity must be at least 1".into(),
            ));
        }

        if let Some(topic) = &self.alerts.publish_topic {
            if topic.is_empty() {
                return Err(ConnectorError::ConfigError(
                    "alerts.publish_topic must not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Broker connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker host name or address
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Client identifier presented to the broker
    pub client_id: String,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
    /// Outgoing QoS 1 publishes (alerts) allowed before the broker's PubAck
    pub max_inflight: u16,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1883,
            client_id: "pitwatch-monitor".into(),
            keep_alive_secs: 60,
            max_inflight: 1,
        }
    }
}

impl BrokerConfig {
    /// Keep-alive as a duration
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    fn validate(&self) -> ConnectorResult<()> {
        if self.host.is_empty() {
            return Err(ConnectorError::ConfigError("broker.host must not be empty".into()));
        }
        if self.client_id.is_empty() {
            return Err(ConnectorError::ConfigError(
                "broker.client_id must not be empty".into(),
            ));
        }
        if self.keep_alive_secs < MIN_KEEP_ALIVE_SECS {
            return Err(ConnectorError::ConfigError(format!(
                "broker.keep_alive_secs must be at least {}",
                MIN_KEEP_ALIVE_SECS
            )));
        }
        if self.max_inflight == 0 {
            return Err(ConnectorError::ConfigError(
                "broker.max_inflight must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Topic carrying each channel's readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Smoker topic
    pub smoker: String,
    /// Food A topic
    pub food_a: String,
    /// Food B topic
    pub food_b: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            smoker: SMOKER_TOPIC.into(),
            food_a: FOOD_A_TOPIC.into(),
            food_b: FOOD_B_TOPIC.into(),
        }
    }
}

impl QueueConfig {
    /// Topic for `channel`
    pub fn topic(&self, channel: ChannelId) -> &str {
        match channel {
            ChannelId::Smoker => &self.smoker,
            ChannelId::FoodA => &self.food_a,
            ChannelId::FoodB => &self.food_b,
        }
    }

    /// Channel whose readings arrive on `topic`
    pub fn channel_for(&self, topic: &str) -> Option<ChannelId> {
        ChannelId::ALL
            .into_iter()
            .find(|&channel| self.topic(channel) == topic)
    }

    fn validate(&self) -> ConnectorResult<()> {
        for channel in ChannelId::ALL {
            let topic = self.topic(channel);
            if topic.is_empty() {
                return Err(ConnectorError::ConfigError(format!(
                    "queues.{} must not be empty",
                    channel.label()
                )));
            }
            if self.channel_for(topic) != Some(channel) {
                return Err(ConnectorError::ConfigError(format!(
                    "topic {} is used by more than one channel",
                    topic
                )));
            }
        }
        Ok(())
    }
}

/// Alert delivery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Alerts buffered between the engine and the sink
    pub queue_capacity: usize,
    /// Also publish alerts as JSON to this topic
    pub publish_topic: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            publish_topic: None,
        }
    }
}

/// CSV replay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Recorded cook to replay
    pub csv_path: String,
    /// Pause between rows, in seconds
    pub interval_secs: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            csv_path: "smoker-temps.csv".into(),
            interval_secs: READING_INTERVAL_SECS,
        }
    }
}

impl ProducerConfig {
    /// Pause between rows
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
