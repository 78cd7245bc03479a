//! Reading Parser
//!
//! Decodes the producer's payload into a [`Reading`]:
//!
//! ```text
//! "03/23/23 14:06:00,212.3"            → Recorded(212.3)
//! "03/23/23 14:06:30,temp not recorded" → Missing
//! "03/23/23 14:07:00,"                  → Missing (empty cell in the source CSV)
//! ",212.3"                              → Recorded(212.3), no timestamp
//! ```
//!
//! The channel is not part of the payload; it comes from whichever topic
//! delivered the message.
//!
//! The not-recorded sentinel is a normal value, never a parse failure.
//! Anything else that isn't a finite number is rejected as
//! [`MonitorError::MalformedPayload`].

use alloc::string::String;

use crate::channel::ChannelId;
use crate::constants::{NOT_RECORDED_SENTINEL, PAYLOAD_SEPARATOR};
use crate::errors::{MonitorError, MonitorResult};
use crate::reading::{Reading, ReadingValue};

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Decode a text payload delivered on `channel`'s topic
pub fn parse_payload(channel: ChannelId, payload: &str) -> MonitorResult<Reading> {
    let (timestamp, temperature) = payload
        .split_once(PAYLOAD_SEPARATOR)
        .ok_or(MonitorError::MalformedPayload {
            reason: "expected \"<timestamp>,<temperature>\"",
        })?;

    let timestamp = timestamp.trim();
    let timestamp = if timestamp.is_empty() {
        None
    } else {
        Some(String::from(timestamp))
    };

    let value = parse_temperature(temperature)?;
    if value.is_missing() {
        log_debug!("{}: payload carries no temperature", channel);
    }

    Ok(Reading {
        timestamp,
        channel,
        value,
    })
}

/// Decode a raw payload, which must be UTF-8
pub fn parse_bytes(channel: ChannelId, payload: &[u8]) -> MonitorResult<Reading> {
    let text = core::str::from_utf8(payload).map_err(|_| MonitorError::MalformedPayload {
        reason: "payload is not valid UTF-8",
    })?;

    parse_payload(channel, text)
}

/// Decode the temperature field alone
pub fn parse_temperature(field: &str) -> MonitorResult<ReadingValue> {
    let field = field.trim();

    if field.is_empty() || field.eq_ignore_ascii_case(NOT_RECORDED_SENTINEL) {
        return Ok(ReadingValue::Missing);
    }

    let value: f32 = field.parse().map_err(|_| MonitorError::MalformedPayload {
        reason: "temperature is not a number",
    })?;

    if !value.is_finite() {
        return Err(MonitorError::MalformedPayload {
            reason: "temperature is not finite",
        });
    }

    Ok(ReadingValue::Recorded(value))
}
