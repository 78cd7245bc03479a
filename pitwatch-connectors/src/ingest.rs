//! Topic-to-engine ingestion
//!
//! [`Ingestor`] is everything the consumer does with one delivery except the
//! broker acknowledgment, so it can be driven directly in tests:
//!
//! 1. map the topic to a channel
//! 2. decode the payload
//! 3. apply the reading to the window manager
//! 4. log the per-reading status line
//! 5. hand any alert to the dispatcher

use pitwatch_core::parser::parse_bytes;
use pitwatch_core::{AlertEvent, ChannelId, MonitorError, MonitorResult, ReadingValue, WindowManager};

use crate::config::{MonitorConfig, QueueConfig};
use crate::dispatch::AlertDispatcher;

/// Turns raw deliveries into engine calls
#[derive(Debug)]
pub struct Ingestor {
    manager: WindowManager,
    queues: QueueConfig,
    dispatcher: Option<AlertDispatcher>,
}

impl Ingestor {
    /// Build the engine from `config`'s channel table and topics
    pub fn new(config: &MonitorConfig) -> MonitorResult<Self> {
        Ok(Self::from_parts(
            WindowManager::new(config.channels)?,
            config.queues.clone(),
        ))
    }

    /// Wrap an existing manager
    pub fn from_parts(manager: WindowManager, queues: QueueConfig) -> Self {
        Self {
            manager,
            queues,
            dispatcher: None,
        }
    }

    /// Forward alerts to `dispatcher` as they fire
    pub fn with_dispatcher(mut self, dispatcher: AlertDispatcher) -> Self {
        self.set_dispatcher(dispatcher);
        self
    }

    /// Replace the alert dispatcher
    pub fn set_dispatcher(&mut self, dispatcher: AlertDispatcher) {
        self.dispatcher = Some(dispatcher);
    }

    /// Channel for `topic`, if it is one of the configured channel topics
    pub fn channel_for(&self, topic: &str) -> MonitorResult<ChannelId> {
        self.queues
            .channel_for(topic)
            .ok_or_else(|| MonitorError::unknown_channel(topic))
    }

    /// Process one delivery
    ///
    /// Errors are already logged when this returns; the caller only decides
    /// what to do with the delivery.
    pub fn ingest(&self, topic: &str, payload: &[u8]) -> MonitorResult<Option<AlertEvent>> {
        let result = self.apply(topic, payload);

        match &result {
            Ok(Some(alert)) => {
                if let Some(dispatcher) = &self.dispatcher {
                    dispatcher.dispatch(alert.clone());
                }
            }
            Ok(None) => {}
            Err(MonitorError::MalformedPayload { reason }) => {
                log::error!(
                    "{}: discarding malformed payload {:?}: {}",
                    topic,
                    String::from_utf8_lossy(payload),
                    reason
                );
            }
            // Unknown channels are logged where they are rejected
            Err(_) => {}
        }

        result
    }

    fn apply(&self, topic: &str, payload: &[u8]) -> MonitorResult<Option<AlertEvent>> {
        let channel = self.channel_for(topic).map_err(|e| {
            log::error!("{}: no channel reads this topic, dropping reading", topic);
            e
        })?;
        let reading = parse_bytes(channel, payload)?;
        let alert = self.manager.process(&reading)?;

        match reading.value {
            ReadingValue::Recorded(temp) => {
                log::info!(" [x] {} temperature is {}", channel.display_name(), temp)
            }
            ReadingValue::Missing => {
                log::info!(" [x] {} temperature not recorded", channel.display_name())
            }
        }

        Ok(alert)
    }

    /// The engine behind this ingestor
    pub fn manager(&self) -> &WindowManager {
        &self.manager
    }

    /// Topic configuration
    pub fn queues(&self) -> &QueueConfig {
        &self.queues
    }

    /// Topics to subscribe to: one per monitored channel
    pub fn topics(&self) -> impl Iterator<Item = &str> + '_ {
        self.manager
            .channels()
            .map(move |channel| self.queues.topic(channel))
    }

    /// Log per-channel counters
    pub fn log_stats(&self) {
        for channel in self.manager.channels() {
            if let Some(stats) = self.manager.stats(channel) {
                log::info!(
                    "{}: {} readings, {} missing, {} windows, {} alerts, {} buffered",
                    channel,
                    stats.readings,
                    stats.missing,
                    stats.evaluations,
                    stats.alerts,
                    stats.buffered
                );
            }
        }

        if let Some(dispatcher) = &self.dispatcher {
            let stats = dispatcher.stats();
            log::info!(
                "alerts: {} delivered, {} failed, {} dropped",
                stats.delivered,
                stats.failed,
                stats.dropped
            );
        }
    }
}
