//! Decoded probe readings

use alloc::string::String;

use crate::channel::ChannelId;

/// Temperature carried by a reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadingValue {
    /// The probe reported a temperature
    Recorded(f32),
    /// The probe reported no data for this interval
    Missing,
}

impl ReadingValue {
    /// The temperature, if one was recorded
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ReadingValue::Recorded(value) => Some(*value),
            ReadingValue::Missing => None,
        }
    }

    /// True when the probe reported no data
    pub fn is_missing(&self) -> bool {
        matches!(self, ReadingValue::Missing)
    }
}

/// One reading for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Timestamp exactly as the producer sent it; `None` if the field was empty
    pub timestamp: Option<String>,
    /// Channel the reading belongs to
    pub channel: ChannelId,
    /// Temperature, or `Missing`
    pub value: ReadingValue,
}

impl Reading {
    /// Reading with a recorded temperature
    pub fn recorded(channel: ChannelId, timestamp: &str, value: f32) -> Self {
        Self {
            timestamp: Some(String::from(timestamp)),
            channel,
            value: ReadingValue::Recorded(value),
        }
    }

    /// Reading where the probe reported no data
    pub fn missing(channel: ChannelId, timestamp: &str) -> Self {
        Self {
            timestamp: Some(String::from(timestamp)),
            channel,
            value: ReadingValue::Missing,
        }
    }

    /// Drop the timestamp
    pub fn without_timestamp(mut self) -> Self {
        self.timestamp = None;
        self
    }

    /// Timestamp as a str, empty when absent
    pub fn timestamp_str(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}
