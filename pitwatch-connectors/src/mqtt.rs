//! MQTT transport
//!
//! ## Consumer
//!
//! One client subscribes to every monitored channel's topic at QoS 1 with
//! manual acknowledgments. Deliveries are handled one at a time: each is
//! ingested and acknowledged before the event loop is polled again.
//! MQTT 3.1.1 gives the subscriber no way to cap how many unacknowledged
//! deliveries the broker sends, so the broker's own in-flight window
//! decides that. `max_inflight` only limits this client's outgoing QoS 1
//! publishes, which here are the alerts sent by [`MqttAlertSink`].
//!
//! Every delivery is acknowledged after [`Ingestor::ingest`] returns, even
//! when the payload was rejected. MQTT has no negative acknowledgment and a
//! redelivered bad payload would be rejected again.
//!
//! Failures to queue an acknowledgment or a subscription are logged and the
//! loop keeps running. An unacknowledged delivery is redelivered by the
//! broker after a reconnect.
//!
//! Subscriptions are renewed on every `ConnAck`, so a clean session after a
//! reconnect picks the topics back up.
//!
//! ## Producer
//!
//! Publishes each CSV row as three `"<timestamp>,<cell>"` messages, one per
//! channel topic, pausing `interval_secs` between rows.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use pitwatch_core::{AlertEvent, ChannelId};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, Publish, QoS};
use tokio::task::JoinHandle;

use crate::config::{BrokerConfig, MonitorConfig, QueueConfig};
use crate::csv_replay::{CsvReplay, ProducerRow};
use crate::dispatch::{AlertDispatcher, AsyncAlertSink};
use crate::ingest::Ingestor;
use crate::ConnectorResult;

/// Client request queue depth
const REQUEST_CAPACITY: usize = 16;

/// Pause before polling again after a connection error
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Time allowed for the producer's last publishes to flush
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client options for `broker`, identified as `client_id`
pub fn mqtt_options(broker: &BrokerConfig, client_id: &str) -> MqttOptions {
    let mut options = MqttOptions::new(client_id, broker.host.clone(), broker.port);
    options
        .set_keep_alive(broker.keep_alive())
        .set_manual_acks(true)
        .set_inflight(broker.max_inflight);
    options
}

/// Broker-driven loop feeding an [`Ingestor`]
pub struct MqttConsumer {
    client: AsyncClient,
    eventloop: EventLoop,
    ingestor: Ingestor,
    topics: Vec<String>,
    broker: String,
}

impl MqttConsumer {
    /// Create the client; nothing connects until [`run`](Self::run)
    pub fn new(config: &MonitorConfig, ingestor: Ingestor) -> Self {
        let options = mqtt_options(&config.broker, &config.broker.client_id);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let topics = ingestor.topics().map(String::from).collect();

        Self {
            client,
            eventloop,
            ingestor,
            topics,
            broker: format!("{}:{}", config.broker.host, config.broker.port),
        }
    }

    /// Forward alerts from the ingestor to `dispatcher`
    pub fn with_dispatcher(mut self, dispatcher: AlertDispatcher) -> Self {
        self.ingestor.set_dispatcher(dispatcher);
        self
    }

    /// Handle for publishing on this connection (e.g. for an alert sink)
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    /// Topics this consumer subscribes to
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Consume until `shutdown` resolves; returns the ingestor for final stats
    pub async fn run<F>(mut self, shutdown: F) -> ConnectorResult<Ingestor>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        log::info!(" [*] Ready for work on {}. To exit press CTRL+C", self.broker);

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => None,
                event = self.eventloop.poll() => Some(event),
            };

            let Some(event) = event else {
                log::info!("User interrupted continuous listening process");
                break;
            };

            match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    log::info!("Connected to {}", self.broker);
                    self.subscribe();
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.handle(&publish);
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("Connection to {} failed: {}", self.broker, e);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }

        if let Err(e) = self.client.try_disconnect() {
            log::debug!("Disconnect request not sent: {}", e);
        }
        log::info!("Closing connection. Goodbye.");

        Ok(self.ingestor)
    }

    // The request queue is drained by this same loop, so never await the
    // client from here
    fn subscribe(&self) {
        for topic in &self.topics {
            match self.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
                Ok(()) => log::info!("Subscribed to {}", topic),
                Err(e) => log::error!("Cannot subscribe to {}: {}", topic, e),
            }
        }
    }

    /// Ingest one delivery and queue its acknowledgment; returns `false` if
    /// the acknowledgment could not be queued
    fn handle(&self, publish: &Publish) -> bool {
        // Rejected payloads are logged by the ingestor and still acknowledged
        let _ = self.ingestor.ingest(&publish.topic, &publish.payload);

        match self.client.try_ack(publish) {
            Ok(()) => true,
            Err(e) => {
                log::error!("{}: acknowledgment not sent, expect redelivery: {}", publish.topic, e);
                false
            }
        }
    }
}

/// Publishes alerts as JSON to a broker topic
pub struct MqttAlertSink {
    client: AsyncClient,
    topic: String,
}

impl MqttAlertSink {
    /// Sink publishing on `client` to `topic`
    pub fn new(client: AsyncClient, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl AsyncAlertSink for MqttAlertSink {
    async fn deliver(&mut self, alert: &AlertEvent) -> ConnectorResult<()> {
        log::warn!("Alert!! {}", alert.message);

        let payload = serde_json::to_vec(alert)?;
        self.client
            .publish(self.topic.as_str(), QoS::AtLeastOnce, false, payload)
            .await?;
        Ok(())
    }
}

/// Replays a probe log onto the channel topics
pub struct MqttProducer {
    client: AsyncClient,
    queues: QueueConfig,
    interval: Duration,
    driver: JoinHandle<()>,
}

impl MqttProducer {
    /// Spawn the connection driver; must be called inside a tokio runtime
    ///
    /// The producer connects as `<client_id>-producer` so it never displaces
    /// a monitor sharing the same config.
    pub fn connect(config: &MonitorConfig) -> Self {
        let client_id = format!("{}-producer", config.broker.client_id);
        let options = mqtt_options(&config.broker, &client_id);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        Self {
            client,
            queues: config.queues.clone(),
            interval: config.producer.interval(),
            driver: tokio::spawn(drive(eventloop)),
        }
    }

    /// Publish one row to all three channel topics
    pub async fn publish_row(&self, row: &ProducerRow) -> ConnectorResult<()> {
        for channel in ChannelId::ALL {
            let topic = self.queues.topic(channel);
            let payload = row.payload(channel);

            self.client
                .publish(topic, QoS::AtLeastOnce, false, payload.clone().into_bytes())
                .await?;
            log::info!(" [x] Sent {} to {}", payload, topic);
        }
        Ok(())
    }

    /// Publish every row, pausing between rows; stops early on `shutdown`
    ///
    /// Returns the number of rows published.
    pub async fn replay<F>(&self, replay: CsvReplay, shutdown: F) -> ConnectorResult<usize>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let total = replay.len();

        for (index, row) in replay.into_iter().enumerate() {
            self.publish_row(&row).await?;

            if index + 1 == total {
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Replay interrupted after {} of {} rows", index + 1, total);
                    return Ok(index + 1);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        Ok(total)
    }

    /// Disconnect and wait briefly for queued publishes to flush
    pub async fn disconnect(self) -> ConnectorResult<()> {
        self.client.disconnect().await?;

        let mut driver = self.driver;
        if tokio::time::timeout(DISCONNECT_TIMEOUT, &mut driver).await.is_err() {
            log::warn!("Broker did not close the connection in time");
            driver.abort();
        }
        Ok(())
    }
}

async fn drive(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
            Ok(Event::Incoming(Packet::ConnAck(_))) => log::info!("Producer connected"),
            Ok(_) => {}
            Err(e) => {
                log::error!("Producer connection failed: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
