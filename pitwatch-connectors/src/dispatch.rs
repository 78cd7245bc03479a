//! Alert dispatch
//!
//! The engine must never wait on a slow sink, so alerts cross a bounded
//! queue to a task that owns the sink:
//!
//! ```text
//! consumer ── try_send ──► [ queue_capacity ] ──► sink task ──► AsyncAlertSink
//!                 │
//!                 └─ full or closed: count as dropped, log, carry on
//! ```
//!
//! The task ends once every [`AlertDispatcher`] handle is dropped and the
//! queue has drained, returning the final counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pitwatch_core::AlertEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ConnectorResult;

/// Destination for alerts
#[async_trait]
pub trait AsyncAlertSink: Send {
    /// Deliver one alert
    async fn deliver(&mut self, alert: &AlertEvent) -> ConnectorResult<()>;
}

/// Dispatch counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Alerts the sink accepted
    pub delivered: u64,
    /// Alerts the sink rejected
    pub failed: u64,
    /// Alerts discarded because the queue was full or closed
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Handle for queueing alerts to a sink task
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    tx: mpsc::Sender<AlertEvent>,
    counters: Arc<Counters>,
}

impl AlertDispatcher {
    /// Spawn the sink task on the current tokio runtime
    ///
    /// `capacity` is raised to 1 if zero.
    pub fn spawn<S>(sink: S, capacity: usize) -> (Self, JoinHandle<DispatchStats>)
    where
        S: AsyncAlertSink + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let counters = Arc::new(Counters::default());
        let handle = tokio::spawn(run_sink(sink, rx, Arc::clone(&counters)));

        (Self { tx, counters }, handle)
    }

    /// Queue an alert without waiting; returns `false` if it was dropped
    pub fn dispatch(&self, alert: AlertEvent) -> bool {
        match self.tx.try_send(alert) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(alert)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("Alert queue full, dropping: {}", alert.message);
                false
            }
            Err(mpsc::error::TrySendError::Closed(alert)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::error!("Alert sink stopped, dropping: {}", alert.message);
                false
            }
        }
    }

    /// Alerts the sink accepted
    pub fn delivered(&self) -> u64 {
        self.counters.delivered.load(Ordering::Relaxed)
    }

    /// Alerts discarded before reaching the sink
    pub fn dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// All counters at once
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }
}

impl Counters {
    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

async fn run_sink<S: AsyncAlertSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<AlertEvent>,
    counters: Arc<Counters>,
) -> DispatchStats {
    while let Some(alert) = rx.recv().await {
        match sink.deliver(&alert).await {
            Ok(()) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("{}: alert delivery failed: {}", alert.channel, e);
            }
        }
    }

    let stats = counters.snapshot();
    log::debug!(
        "Alert sink task finished: {} delivered, {} failed, {} dropped",
        stats.delivered,
        stats.failed,
        stats.dropped
    );
    stats
}

/// Writes alerts to the log at `warn`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

#[async_trait]
impl AsyncAlertSink for LogAlertSink {
    async fn deliver(&mut self, alert: &AlertEvent) -> ConnectorResult<()> {
        log::warn!(
            "Alert!! [{}] {}",
            alert.timestamp.as_deref().unwrap_or("-"),
            alert.message
        );
        Ok(())
    }
}

/// Keeps every alert in memory; clones share the same list
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    alerts: Arc<Mutex<Vec<AlertEvent>>>,
}

impl CollectingSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything collected so far
    pub fn alerts(&self) -> Vec<AlertEvent> {
        match self.alerts.lock() {
            Ok(alerts) => alerts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of alerts collected
    pub fn len(&self) -> usize {
        self.alerts().len()
    }

    /// True when nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AsyncAlertSink for CollectingSink {
    async fn deliver(&mut self, alert: &AlertEvent) -> ConnectorResult<()> {
        let mut alerts = match self.alerts.lock() {
            Ok(alerts) => alerts,
            Err(poisoned) => poisoned.into_inner(),
        };
        alerts.push(alert.clone());
        Ok(())
    }
}
