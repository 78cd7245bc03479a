//! Channel Defaults and Limits
//!
//! Every numeric value the engine relies on lives here, grouped by channel.
//! Temperatures are in the probe's native unit (°F for the stock smoker
//! rig); the engine itself is unit-agnostic.
//!
//! The stock producer publishes one reading per channel every 30 seconds,
//! so a window of N readings spans N × 30 s of cook time.

// ===== WINDOW LIMITS =====

/// Largest window any channel may be configured with.
///
/// Windows live in fixed inline storage of this many slots, so the bound
/// also caps the per-channel memory footprint.
pub const MAX_WINDOW_SIZE: usize = 64;

/// Nominal interval between readings from the stock producer (seconds).
pub const READING_INTERVAL_SECS: u64 = 30;

// ===== SMOKER CHANNEL =====

/// Smoker window: 5 readings, 2.5 minutes of cook time.
pub const SMOKER_WINDOW_SIZE: usize = 5;

/// Smoker alert fires when the temperature fell more than this many degrees
/// from any reading still inside the window.
///
/// A drop this fast usually means the fire went out or the lid was left open.
pub const SMOKER_MAX_DROP: f32 = 15.0;

// ===== FOOD A CHANNEL =====

/// Food A window: 20 readings, 10 minutes of cook time.
pub const FOOD_A_WINDOW_SIZE: usize = 20;

/// Food A alert fires when the temperature fell more than this many degrees
/// from any reading still inside the window.
pub const FOOD_A_MAX_DROP: f32 = 1.0;

// ===== FOOD B CHANNEL =====

/// Food B window: 20 readings, 10 minutes of cook time.
pub const FOOD_B_WINDOW_SIZE: usize = 20;

/// Food B stalls when the net change across a whole window is smaller than
/// this many degrees.
///
/// Large cuts commonly plateau for hours while moisture evaporates
/// ("the stall").
pub const FOOD_B_STALL_DELTA: f32 = 1.0;

// ===== PAYLOAD FORMAT =====

/// Sentinel the probes send in place of a temperature when nothing was read.
pub const NOT_RECORDED_SENTINEL: &str = "temp not recorded";

/// Field separator between timestamp and temperature in a payload.
pub const PAYLOAD_SEPARATOR: char = ',';

/// Stock topic (queue) names, one per channel.
pub const SMOKER_TOPIC: &str = "01-smoker";
/// Food A topic name.
pub const FOOD_A_TOPIC: &str = "02-food-A";
/// Food B topic name.
pub const FOOD_B_TOPIC: &str = "03-food-B";
