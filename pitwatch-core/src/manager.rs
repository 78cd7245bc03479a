//! Window Manager
//!
//! ## Overview
//!
//! Routes every reading to its channel's window and drives the batch-window
//! lifecycle:
//!
//! ```text
//!            append            append (len == window_size)
//!  EMPTY ─────────────► FILLING ─────────────────────────► FULL
//!    ▲                                                      │
//!    │          evaluate → emit alert or not, then reset    │
//!    └──────────────────────────────────────────────────────┘
//! ```
//!
//! Each window of `window_size` consecutive valid readings is evaluated
//! exactly once and then discarded. Windows do not slide.
//!
//! ## Concurrency
//!
//! Every channel sits behind its own `Mutex`. Readings for different
//! channels never contend; readings for the same channel are applied one at
//! a time in the order callers hand them in. The channel table is fixed at
//! construction, so finding a channel takes no lock at all.
//!
//! `process` performs no I/O. Alerts are returned to the caller, which hands
//! them to an alert sink without holding any window lock.
//!
//! ## Fault Isolation
//!
//! A reading for an unmonitored channel is rejected with
//! [`MonitorError::UnknownChannel`] and touches nothing. A poisoned channel
//! lock (a panic while a reading was applied) is recovered and its window
//! reset, so one bad channel can't take the others down.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::channel::{ChannelConfig, ChannelId, ChannelTable, CHANNEL_COUNT};
use crate::errors::{MonitorError, MonitorResult};
use crate::events::AlertEvent;
use crate::reading::{Reading, ReadingValue};
use crate::trend;
use crate::window::{ChannelWindow, WindowSnapshot};

/// Point-in-time counters for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Readings with a recorded temperature
    pub readings: u64,
    /// Readings where the probe reported no data
    pub missing: u64,
    /// Full windows evaluated
    pub evaluations: u64,
    /// Alerts raised
    pub alerts: u64,
    /// Readings currently buffered toward the next evaluation
    pub buffered: usize,
}

/// Live counters; relaxed ordering is enough since nothing synchronises on them
#[derive(Debug, Default)]
struct ChannelCounters {
    readings: AtomicU64,
    missing: AtomicU64,
    evaluations: AtomicU64,
    alerts: AtomicU64,
}

#[derive(Debug)]
struct ChannelSlot {
    config: ChannelConfig,
    window: Mutex<ChannelWindow>,
    counters: ChannelCounters,
}

impl ChannelSlot {
    fn new(window: ChannelWindow) -> Self {
        Self {
            config: *window.config(),
            window: Mutex::new(window),
            counters: ChannelCounters::default(),
        }
    }

    fn lock(&self, channel: ChannelId) -> MutexGuard<'_, ChannelWindow> {
        self.window.lock().unwrap_or_else(|poisoned| {
            log::error!("{}: window lock poisoned, discarding buffered readings", channel);
            self.window.clear_poison();
            let mut window = poisoned.into_inner();
            window.reset();
            window
        })
    }
}

/// Routes readings to per-channel windows and decides when alerts fire
#[derive(Debug)]
pub struct WindowManager {
    slots: [Option<ChannelSlot>; CHANNEL_COUNT],
}

impl WindowManager {
    /// Build one window per configured channel
    pub fn new(table: ChannelTable) -> MonitorResult<Self> {
        table.validate()?;
        Ok(Self::from_valid_table(&table))
    }

    /// Manager for the stock smoker, Food A and Food B channels
    pub fn with_defaults() -> Self {
        Self::from_valid_table(&ChannelTable::default())
    }

    fn from_valid_table(table: &ChannelTable) -> Self {
        let mut slots: [Option<ChannelSlot>; CHANNEL_COUNT] = [None, None, None];

        for (channel, config) in table.iter() {
            log::debug!(
                "{}: window of {} readings, {:?} threshold {}",
                channel,
                config.window_size,
                config.predicate,
                config.threshold
            );
            slots[channel.index()] = Some(ChannelSlot::new(ChannelWindow::from_valid(*config)));
        }

        Self { slots }
    }

    /// Apply one reading; returns the alert if this reading completed a
    /// window whose predicate holds
    ///
    /// Missing values are counted and logged but never buffered.
    pub fn process(&self, reading: &Reading) -> MonitorResult<Option<AlertEvent>> {
        let channel = reading.channel;

        let value = match reading.value {
            ReadingValue::Recorded(value) => value,
            ReadingValue::Missing => {
                if let Some(slot) = self.slot(channel) {
                    slot.counters.missing.fetch_add(1, Ordering::Relaxed);
                }
                log::warn!("{}: no data at {}", channel, reading.timestamp_str());
                return Ok(None);
            }
        };

        let slot = self.slot(channel).ok_or_else(|| {
            log::error!("{}: no window configured, dropping reading", channel);
            MonitorError::unknown_channel(channel.label())
        })?;

        slot.counters.readings.fetch_add(1, Ordering::Relaxed);

        let mut window = slot.lock(channel);
        window.append(value);
        log::trace!("{}: appended {} ({}/{})", channel, value, window.len(), window.capacity());

        if !window.is_full() {
            return Ok(None);
        }

        let snapshot = window.snapshot();
        window.reset();
        drop(window);

        slot.counters.evaluations.fetch_add(1, Ordering::Relaxed);

        let config = &slot.config;
        let fired = trend::evaluate(&snapshot, config);
        log::debug!("{}: evaluated full window {:?} -> {}", channel, snapshot.as_slice(), fired);

        if !fired {
            return Ok(None);
        }

        slot.counters.alerts.fetch_add(1, Ordering::Relaxed);

        let change = trend::magnitude(&snapshot, config).unwrap_or(0.0);
        let alert = AlertEvent::new(channel, config, reading.timestamp.clone(), value, change);
        log::warn!("ALERT {}", alert.message);

        Ok(Some(alert))
    }

    /// True if `channel` has a window
    pub fn is_monitored(&self, channel: ChannelId) -> bool {
        self.slot(channel).is_some()
    }

    /// Monitored channels, in table order
    pub fn channels(&self) -> impl Iterator<Item = ChannelId> + '_ {
        ChannelId::ALL.into_iter().filter(move |id| self.is_monitored(*id))
    }

    /// Config in force for `channel`
    pub fn config(&self, channel: ChannelId) -> Option<ChannelConfig> {
        self.slot(channel).map(|slot| slot.config)
    }

    /// Readings currently buffered for `channel`, oldest first
    pub fn snapshot(&self, channel: ChannelId) -> Option<WindowSnapshot> {
        self.slot(channel).map(|slot| slot.lock(channel).snapshot())
    }

    /// Counters for `channel`
    pub fn stats(&self, channel: ChannelId) -> Option<ChannelStats> {
        let slot = self.slot(channel)?;
        let buffered = slot.lock(channel).len();

        Some(ChannelStats {
            readings: slot.counters.readings.load(Ordering::Relaxed),
            missing: slot.counters.missing.load(Ordering::Relaxed),
            evaluations: slot.counters.evaluations.load(Ordering::Relaxed),
            alerts: slot.counters.alerts.load(Ordering::Relaxed),
            buffered,
        })
    }

    fn slot(&self, channel: ChannelId) -> Option<&ChannelSlot> {
        self.slots[channel.index()].as_ref()
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::PredicateKind;

    fn feed(manager: &WindowManager, channel: ChannelId, temps: &[f32]) -> Vec<AlertEvent> {
        temps
            .iter()
            .enumerate()
            .filter_map(|(i, &temp)| {
                let ts = format!("t{}", i);
                manager.process(&Reading::recorded(channel, &ts, temp)).unwrap()
            })
            .collect()
    }

    #[test]
    fn smoker_drop_alerts_then_resets() {
        let manager = WindowManager::with_defaults();

        let alerts = feed(&manager, ChannelId::Smoker, &[100.0, 98.0, 90.0, 84.0, 83.0]);
        assert_eq!(alerts.len(), 1);

        let alert = &alerts[0];
        assert_eq!(alert.channel, ChannelId::Smoker);
        assert_eq!(alert.timestamp.as_deref(), Some("t4"));
        assert_eq!(alert.triggering_value, 83.0);
        assert_eq!(alert.change, 17.0);

        assert!(manager.snapshot(ChannelId::Smoker).unwrap().is_empty());
    }

    #[test]
    fn smoker_gentle_decline_no_alert_but_still_resets() {
        let manager = WindowManager::with_defaults();

        let alerts = feed(&manager, ChannelId::Smoker, &[100.0, 95.0, 92.0, 90.0, 88.0]);
        assert!(alerts.is_empty());
        assert!(manager.snapshot(ChannelId::Smoker).unwrap().is_empty());

        let stats = manager.stats(ChannelId::Smoker).unwrap();
        assert_eq!(stats.evaluations, 1);
        assert_eq!(stats.alerts, 0);
    }

    #[test]
    fn stall_fires_once_at_last_reading() {
        let manager = WindowManager::with_defaults();

        for i in 0..19 {
            let reading = Reading::recorded(ChannelId::FoodB, "t", 225.0);
            assert!(manager.process(&reading).unwrap().is_none(), "fired early at {}", i);
        }

        let alert = manager
            .process(&Reading::recorded(ChannelId::FoodB, "t19", 225.0))
            .unwrap()
            .expect("stall alert on 20th reading");
        assert_eq!(alert.channel, ChannelId::FoodB);
        assert_eq!(alert.change, 0.0);
    }

    #[test]
    fn missing_value_leaves_window_alone() {
        let manager = WindowManager::with_defaults();
        feed(&manager, ChannelId::Smoker, &[100.0, 98.0]);

        let before = manager.snapshot(ChannelId::Smoker).unwrap();
        let result = manager.process(&Reading::missing(ChannelId::Smoker, "t2")).unwrap();
        assert!(result.is_none());
        assert_eq!(manager.snapshot(ChannelId::Smoker).unwrap(), before);

        let stats = manager.stats(ChannelId::Smoker).unwrap();
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.readings, 2);
        assert_eq!(stats.buffered, 2);
    }

    #[test]
    fn missing_values_do_not_count_toward_window() {
        let manager = WindowManager::with_defaults();

        manager.process(&Reading::recorded(ChannelId::Smoker, "t0", 100.0)).unwrap();
        manager.process(&Reading::missing(ChannelId::Smoker, "t1")).unwrap();
        manager.process(&Reading::recorded(ChannelId::Smoker, "t2", 98.0)).unwrap();
        manager.process(&Reading::missing(ChannelId::Smoker, "t3")).unwrap();

        assert_eq!(manager.snapshot(ChannelId::Smoker).unwrap().as_slice(), &[100.0, 98.0]);
    }

    #[test]
    fn unknown_channel_rejected_without_side_effects() {
        let table = ChannelTable::default().without(ChannelId::FoodB);
        let manager = WindowManager::new(table).unwrap();

        feed(&manager, ChannelId::Smoker, &[100.0, 99.0]);
        feed(&manager, ChannelId::FoodA, &[150.0]);

        let result = manager.process(&Reading::recorded(ChannelId::FoodB, "t", 225.0));
        assert!(matches!(result, Err(MonitorError::UnknownChannel { .. })));

        assert_eq!(manager.snapshot(ChannelId::Smoker).unwrap().as_slice(), &[100.0, 99.0]);
        assert_eq!(manager.snapshot(ChannelId::FoodA).unwrap().as_slice(), &[150.0]);
        assert!(manager.snapshot(ChannelId::FoodB).is_none());

        // Manager keeps working afterwards
        let alerts = feed(&manager, ChannelId::Smoker, &[98.0, 90.0, 70.0]);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn channels_are_independent() {
        let manager = WindowManager::with_defaults();

        // Interleave: smoker completes a window while food A is mid-fill
        feed(&manager, ChannelId::FoodA, &[150.0, 151.0, 152.0]);
        let alerts = feed(&manager, ChannelId::Smoker, &[100.0, 98.0, 90.0, 84.0, 83.0]);
        assert_eq!(alerts.len(), 1);

        assert_eq!(manager.snapshot(ChannelId::FoodA).unwrap().len(), 3);
        assert!(manager.snapshot(ChannelId::FoodB).unwrap().is_empty());
    }

    #[test]
    fn identical_cycles_give_identical_decisions() {
        let manager = WindowManager::with_defaults();
        let cycle = [100.0, 98.0, 90.0, 84.0, 83.0];

        for _ in 0..5 {
            let alerts = feed(&manager, ChannelId::Smoker, &cycle);
            assert_eq!(alerts.len(), 1);
        }

        assert_eq!(manager.stats(ChannelId::Smoker).unwrap().alerts, 5);
    }

    #[test]
    fn invalid_table_rejected() {
        let bad = ChannelConfig {
            window_size: 0,
            predicate: PredicateKind::Stall,
            threshold: 1.0,
        };
        let table = ChannelTable::default().with(ChannelId::FoodA, bad);
        assert!(matches!(
            WindowManager::new(table),
            Err(MonitorError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn concurrent_channels() {
        use std::sync::Arc;
        use std::thread;

        let manager = Arc::new(WindowManager::with_defaults());
        let mut handles = Vec::new();

        for channel in ChannelId::ALL {
            let manager = Arc::clone(&manager);
            handles.push(thread::spawn(move || {
                let mut fired = 0;
                for _ in 0..100 {
                    let reading = Reading::recorded(channel, "t", 225.0);
                    if manager.process(&reading).unwrap().is_some() {
                        fired += 1;
                    }
                }
                fired
            }));
        }

        let fired: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Flat readings: no drops, but food B stalls on every full window
        assert_eq!(fired, vec![0, 0, 5]);
        assert_eq!(manager.stats(ChannelId::Smoker).unwrap().evaluations, 20);
        assert_eq!(manager.stats(ChannelId::FoodA).unwrap().evaluations, 5);
    }
}
