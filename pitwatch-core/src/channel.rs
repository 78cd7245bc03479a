//! Channels and their immutable configuration
//!
//! A channel is one independent probe stream. Each channel gets exactly one
//! [`ChannelConfig`]: how many readings make a window, which trend predicate
//! runs over a full window, and the predicate's threshold.
//!
//! The stock table mirrors the rig the engine was built for:
//!
//! | Channel | Window | Predicate  | Threshold |
//! |---------|--------|------------|-----------|
//! | Smoker  | 5      | `MaxDrop`  | 15.0      |
//! | Food A  | 20     | `MaxDrop`  | 1.0       |
//! | Food B  | 20     | `Stall`    | 1.0       |
//!
//! Configuration is fixed once the [`WindowManager`](crate::WindowManager)
//! is built. There is no API for changing a channel at runtime.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    FOOD_A_MAX_DROP, FOOD_A_TOPIC, FOOD_A_WINDOW_SIZE, FOOD_B_STALL_DELTA, FOOD_B_TOPIC,
    FOOD_B_WINDOW_SIZE, MAX_WINDOW_SIZE, SMOKER_MAX_DROP, SMOKER_TOPIC, SMOKER_WINDOW_SIZE,
};
use crate::errors::{MonitorError, MonitorResult};

/// Number of channels the rig exposes
pub const CHANNEL_COUNT: usize = 3;

/// Probe channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum ChannelId {
    /// Smoker chamber probe
    Smoker = 0,
    /// First food probe
    FoodA = 1,
    /// Second food probe
    FoodB = 2,
}

impl ChannelId {
    /// Every channel, in table order
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [ChannelId::Smoker, ChannelId::FoodA, ChannelId::FoodB];

    /// Position in per-channel arrays
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Machine-readable name, used in config files and logs
    pub const fn label(&self) -> &'static str {
        match self {
            ChannelId::Smoker => "smoker",
            ChannelId::FoodA => "food_a",
            ChannelId::FoodB => "food_b",
        }
    }

    /// Human-readable name, used in alert messages
    pub const fn display_name(&self) -> &'static str {
        match self {
            ChannelId::Smoker => "Smoker",
            ChannelId::FoodA => "Food A",
            ChannelId::FoodB => "Food B",
        }
    }

    /// Topic the stock producer publishes this channel on
    pub const fn default_topic(&self) -> &'static str {
        match self {
            ChannelId::Smoker => SMOKER_TOPIC,
            ChannelId::FoodA => FOOD_A_TOPIC,
            ChannelId::FoodB => FOOD_B_TOPIC,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChannelId {
    type Err = MonitorError;

    /// Accepts the label (`food_a`) or the stock topic name (`02-food-A`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelId::ALL
            .iter()
            .copied()
            .find(|id| id.label() == s || id.default_topic() == s)
            .ok_or_else(|| MonitorError::unknown_channel(s))
    }
}

/// Shape of the trend predicate run over a full window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PredicateKind {
    /// Some earlier reading exceeds the newest one by more than the threshold
    MaxDrop,
    /// Net change from oldest to newest is smaller in magnitude than the threshold
    Stall,
    /// Some single step between consecutive readings fell by more than the threshold
    StepDrop,
}

impl PredicateKind {
    /// Short description used to build alert messages
    pub const fn describe(&self) -> &'static str {
        match self {
            PredicateKind::MaxDrop => "temperature dropped by more than",
            PredicateKind::Stall => "temperature changed by less than",
            PredicateKind::StepDrop => "temperature fell in a single step by more than",
        }
    }
}

/// Per-channel window and predicate settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelConfig {
    /// Readings per window; the predicate runs once this many have arrived
    pub window_size: usize,
    /// Which predicate decides the alert
    pub predicate: PredicateKind,
    /// Predicate threshold in degrees
    pub threshold: f32,
}

impl ChannelConfig {
    /// Build a config, rejecting values that can never yield a usable window
    pub fn new(window_size: usize, predicate: PredicateKind, threshold: f32) -> MonitorResult<Self> {
        let config = Self {
            window_size,
            predicate,
            threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Stock smoker settings: 5 readings, drop of more than 15°
    pub const fn smoker() -> Self {
        Self {
            window_size: SMOKER_WINDOW_SIZE,
            predicate: PredicateKind::MaxDrop,
            threshold: SMOKER_MAX_DROP,
        }
    }

    /// Stock Food A settings: 20 readings, drop of more than 1°
    ///
    /// Uses [`PredicateKind::MaxDrop`] rather than [`PredicateKind::StepDrop`]:
    /// meat cooling half a degree per reading is still a drop worth reporting,
    /// and only the first-to-largest comparison sees it. Tables that want the
    /// per-step rule can select `StepDrop`.
    pub const fn food_a() -> Self {
        Self {
            window_size: FOOD_A_WINDOW_SIZE,
            predicate: PredicateKind::MaxDrop,
            threshold: FOOD_A_MAX_DROP,
        }
    }

    /// Stock Food B settings: 20 readings, net change under 1°
    pub const fn food_b() -> Self {
        Self {
            window_size: FOOD_B_WINDOW_SIZE,
            predicate: PredicateKind::Stall,
            threshold: FOOD_B_STALL_DELTA,
        }
    }

    /// Stock settings for a channel
    pub const fn default_for(channel: ChannelId) -> Self {
        match channel {
            ChannelId::Smoker => Self::smoker(),
            ChannelId::FoodA => Self::food_a(),
            ChannelId::FoodB => Self::food_b(),
        }
    }

    /// Check the config against window and threshold limits
    pub fn validate(&self) -> MonitorResult<()> {
        if self.window_size == 0 {
            return Err(MonitorError::InvalidConfig {
                reason: "window_size must be at least 1",
            });
        }

        if self.window_size > MAX_WINDOW_SIZE {
            return Err(MonitorError::InvalidConfig {
                reason: "window_size exceeds MAX_WINDOW_SIZE",
            });
        }

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(MonitorError::InvalidConfig {
                reason: "threshold must be a finite, non-negative number",
            });
        }

        // Both comparisons need at least two points to mean anything
        if self.window_size < 2 && self.predicate != PredicateKind::MaxDrop {
            return Err(MonitorError::InvalidConfig {
                reason: "stall and step predicates need a window of at least 2",
            });
        }

        Ok(())
    }
}

/// Immutable set of channel configs, one optional slot per channel
///
/// A `None` slot means the channel is not monitored; readings for it are
/// rejected with [`MonitorError::UnknownChannel`].
///
/// In config files, an omitted channel keeps its stock settings and an
/// explicit `null` disables it:
///
/// ```json
/// { "smoker": { "window_size": 10, "predicate": "max_drop", "threshold": 20.0 },
///   "food_b": null }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelTable {
    /// Smoker channel settings
    #[cfg_attr(feature = "serde", serde(default = "stock_smoker"))]
    pub smoker: Option<ChannelConfig>,
    /// Food A channel settings
    #[cfg_attr(feature = "serde", serde(default = "stock_food_a"))]
    pub food_a: Option<ChannelConfig>,
    /// Food B channel settings
    #[cfg_attr(feature = "serde", serde(default = "stock_food_b"))]
    pub food_b: Option<ChannelConfig>,
}

#[cfg(feature = "serde")]
fn stock_smoker() -> Option<ChannelConfig> {
    Some(ChannelConfig::smoker())
}

#[cfg(feature = "serde")]
fn stock_food_a() -> Option<ChannelConfig> {
    Some(ChannelConfig::food_a())
}

#[cfg(feature = "serde")]
fn stock_food_b() -> Option<ChannelConfig> {
    Some(ChannelConfig::food_b())
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self {
            smoker: Some(ChannelConfig::smoker()),
            food_a: Some(ChannelConfig::food_a()),
            food_b: Some(ChannelConfig::food_b()),
        }
    }
}

impl ChannelTable {
    /// Table with no channels configured
    pub const fn empty() -> Self {
        Self {
            smoker: None,
            food_a: None,
            food_b: None,
        }
    }

    /// Set (or replace) one channel's config
    pub fn with(mut self, channel: ChannelId, config: ChannelConfig) -> Self {
        *self.slot_mut(channel) = Some(config);
        self
    }

    /// Stop monitoring a channel
    pub fn without(mut self, channel: ChannelId) -> Self {
        *self.slot_mut(channel) = None;
        self
    }

    /// Config for a channel, if monitored
    pub fn get(&self, channel: ChannelId) -> Option<&ChannelConfig> {
        match channel {
            ChannelId::Smoker => self.smoker.as_ref(),
            ChannelId::FoodA => self.food_a.as_ref(),
            ChannelId::FoodB => self.food_b.as_ref(),
        }
    }

    /// Monitored channels and their configs, in table order
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &ChannelConfig)> {
        ChannelId::ALL
            .into_iter()
            .filter_map(move |id| self.get(id).map(|config| (id, config)))
    }

    /// Validate every configured channel
    pub fn validate(&self) -> MonitorResult<()> {
        for (_, config) in self.iter() {
            config.validate()?;
        }
        Ok(())
    }

    fn slot_mut(&mut self, channel: ChannelId) -> &mut Option<ChannelConfig> {
        match channel {
            ChannelId::Smoker => &mut self.smoker,
            ChannelId::FoodA => &mut self.food_a,
            ChannelId::FoodB => &mut self.food_b,
        }
    }
}
