//! Error types for the monitoring core
//!
//! ## Design
//!
//! Errors stay small and heap-free so they can be returned from the hot path
//! on every reading:
//!
//! - Messages are `&'static str`
//! - Channel names are stored inline in a fixed-capacity string
//!
//! ## Error Categories
//!
//! - `MalformedPayload`: the raw payload could not be decoded into a reading.
//!   Raised by the parser, never by the window manager.
//! - `UnknownChannel`: a reading or topic names a channel with no configured
//!   window. The reading is dropped; every other channel keeps running.
//! - `InvalidConfig`: a channel table entry can never produce a valid window.
//!
//! A reading whose sensor reported no data is *not* an error. It is a normal
//! [`ReadingValue::Missing`](crate::reading::ReadingValue::Missing) value.
//!
//! ```rust
//! use pitwatch_core::{parse_payload, ChannelId, MonitorError};
//!
//! match parse_payload(ChannelId::Smoker, "03/23/23 14:06:00,abc") {
//!     Err(MonitorError::MalformedPayload { reason }) => {
//!         // log and discard the message
//!         assert!(!reason.is_empty());
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use thiserror_no_std::Error;

/// Longest channel name kept inline in an error (longer names are cut)
pub const MAX_CHANNEL_NAME: usize = 32;

/// Inline channel name carried by [`MonitorError::UnknownChannel`]
pub type ChannelName = heapless::String<MAX_CHANNEL_NAME>;

/// Result type for monitoring operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Monitoring errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// Payload could not be decoded into a reading
    #[error("Malformed payload: {reason}")]
    MalformedPayload {
        /// What was wrong with the payload
        reason: &'static str,
    },

    /// No window is configured for this channel
    #[error("Unknown channel: {channel}")]
    UnknownChannel {
        /// The channel name or topic that failed to resolve
        channel: ChannelName,
    },

    /// Channel configuration can never yield a usable window
    #[error("Invalid channel config: {reason}")]
    InvalidConfig {
        /// Which constraint the config broke
        reason: &'static str,
    },
}

impl MonitorError {
    /// Build an `UnknownChannel` error, truncating names that don't fit inline
    pub fn unknown_channel(name: &str) -> Self {
        let mut channel = ChannelName::new();
        for ch in name.chars() {
            if channel.push(ch).is_err() {
                break;
            }
        }
        Self::UnknownChannel { channel }
    }
}
