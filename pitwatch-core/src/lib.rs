//! Core trend-detection engine for PitWatch
//!
//! Watches independent temperature channels (a smoker probe and two food
//! probes) and raises an alert when a channel's recent readings satisfy its
//! trend condition: a rapid drop, or a stall.
//!
//! Key constraints:
//! - One bounded window per channel, never shared between channels
//! - No I/O anywhere in the core
//! - Evaluation is a pure function over the window contents
//!
//! ```
//! use pitwatch_core::{ChannelId, Reading, WindowManager};
//!
//! let manager = WindowManager::with_defaults();
//!
//! let mut alerts = Vec::new();
//! for temp in [100.0, 98.0, 90.0, 84.0, 83.0] {
//!     let reading = Reading::recorded(ChannelId::Smoker, "03/23/23 14:06:00", temp);
//!     if let Some(alert) = manager.process(&reading).unwrap() {
//!         alerts.push(alert);
//!     }
//! }
//!
//! assert_eq!(alerts.len(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod buffer;
pub mod channel;
pub mod constants;
pub mod errors;
pub mod events;
pub mod parser;
pub mod reading;
pub mod traits;
pub mod trend;
pub mod window;

#[cfg(feature = "std")]
pub mod manager;

// Public API
pub use channel::{ChannelConfig, ChannelId, ChannelTable, PredicateKind};
pub use errors::{MonitorError, MonitorResult};
pub use events::AlertEvent;
pub use parser::parse_payload;
pub use reading::{Reading, ReadingValue};
pub use traits::TrendPredicate;
pub use trend::{evaluate, MaxDrop, Stall, StepDrop};
pub use window::ChannelWindow;

#[cfg(feature = "std")]
pub use manager::{ChannelStats, WindowManager};

/// Crate version, for log banners
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
