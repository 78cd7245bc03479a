//! Alert events produced by the window manager
//!
//! The core only builds the event. Formatting for humans beyond the short
//! `message`, and delivery to whoever cares, belong to the alert sink.

use alloc::format;
use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelConfig, ChannelId, PredicateKind};
use crate::constants::READING_INTERVAL_SECS;

/// A channel's trend condition held over a full window
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlertEvent {
    /// Channel that raised the alert
    pub channel: ChannelId,
    /// Timestamp of the reading that completed the window
    pub timestamp: Option<String>,
    /// Value of the reading that completed the window
    pub triggering_value: f32,
    /// Degrees measured by the predicate (largest drop, or net change)
    pub change: f32,
    /// Short description of what happened
    pub message: String,
}

impl AlertEvent {
    /// Build an alert with the stock message for `config`
    pub fn new(
        channel: ChannelId,
        config: &ChannelConfig,
        timestamp: Option<String>,
        triggering_value: f32,
        change: f32,
    ) -> Self {
        let message = alert_message(channel, config, triggering_value, change);

        Self {
            channel,
            timestamp,
            triggering_value,
            change,
            message,
        }
    }
}

/// Message text for an alert on `channel`
///
/// ```text
/// Smoker: temperature dropped by more than 15 degrees in 2.5 minutes (latest=83, change=17)
/// Food B: food stall! temperature changed by less than 1 degree in 10 minutes (latest=225, change=0)
/// ```
pub fn alert_message(channel: ChannelId, config: &ChannelConfig, latest: f32, change: f32) -> String {
    let stall = if config.predicate == PredicateKind::Stall {
        "food stall! "
    } else {
        ""
    };

    let unit = if config.threshold == 1.0 { "degree" } else { "degrees" };

    format!(
        "{}: {}{} {} {} in {} (latest={}, change={})",
        channel.display_name(),
        stall,
        config.predicate.describe(),
        config.threshold,
        unit,
        window_span(config.window_size),
        latest,
        change,
    )
}

/// Cook time covered by a window of `readings`, e.g. "2.5 minutes"
fn window_span(readings: usize) -> String {
    let secs = readings as u64 * READING_INTERVAL_SECS;

    if secs % 60 == 0 {
        let minutes = secs / 60;
        if minutes == 1 {
            String::from("1 minute")
        } else {
            format!("{} minutes", minutes)
        }
    } else {
        format!("{} minutes", secs as f32 / 60.0)
    }
}
