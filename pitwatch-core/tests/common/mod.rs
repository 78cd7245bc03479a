//! Shared fixtures for integration tests
//!
//! Generates cook-like temperature series and feeds them through a manager.

#![allow(dead_code)]

use pitwatch_core::{AlertEvent, ChannelId, Reading, WindowManager};

/// Timestamp in the producer's format for the n-th 30 s reading
pub fn timestamp(n: usize) -> String {
    let secs = 14 * 3600 + 6 * 60 + n * 30;
    format!("03/23/23 {:02}:{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60, secs % 60)
}

/// `n` identical readings
pub fn flat(value: f32, n: usize) -> Vec<f32> {
    vec![value; n]
}

/// `n` evenly spaced readings from `from` to `to` inclusive
pub fn ramp(from: f32, to: f32, n: usize) -> Vec<f32> {
    if n < 2 {
        return vec![from; n];
    }
    let step = (to - from) / (n - 1) as f32;
    (0..n).map(|i| from + step * i as f32).collect()
}

/// Feed recorded readings in order, collecting every alert
pub fn feed(manager: &WindowManager, channel: ChannelId, temps: &[f32]) -> Vec<AlertEvent> {
    temps
        .iter()
        .enumerate()
        .filter_map(|(i, &temp)| {
            manager
                .process(&Reading::recorded(channel, &timestamp(i), temp))
                .expect("configured channel")
        })
        .collect()
}

/// Feed readings where `None` means the probe reported no data
pub fn feed_with_gaps(
    manager: &WindowManager,
    channel: ChannelId,
    temps: &[Option<f32>],
) -> Vec<AlertEvent> {
    temps
        .iter()
        .enumerate()
        .filter_map(|(i, temp)| {
            let reading = match temp {
                Some(t) => Reading::recorded(channel, &timestamp(i), *t),
                None => Reading::missing(channel, &timestamp(i)),
            };
            manager.process(&reading).expect("configured channel")
        })
        .collect()
}
