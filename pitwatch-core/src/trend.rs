//! Trend Evaluator
//!
//! ## Overview
//!
//! Pure functions that look at one full window of readings (oldest first)
//! and decide whether the channel's alert condition holds. Nothing here
//! keeps state; evaluating the same window twice always gives the same
//! answer.
//!
//! ## Predicates
//!
//! ### Max drop
//! Compare every earlier reading against the newest one:
//! ```text
//! window = [100, 98, 90, 84, 83], threshold = 15
//! drops  = [ 17, 15,  7,  1]      (v - latest)
//! 17 > 15 → alert
//! ```
//! Equality never fires: a drop of exactly 15 is not "more than 15".
//!
//! ### Stall
//! Only the two ends of the window matter:
//! ```text
//! net = window[last] - window[first]
//! |net| < threshold → alert
//! ```
//! The magnitude is used so a channel that is barely falling stalls just
//! like one that is barely rising. A steep fall is *not* a stall.
//!
//! ### Step drop
//! Consecutive pairs only:
//! ```text
//! window[i] - window[i + 1] > threshold for any i → alert
//! ```
//! Not used by the stock table, but available for channels where a single
//! sudden fall matters more than the overall trend.
//!
//! ## Preconditions
//!
//! [`evaluate`] only answers for a window holding exactly
//! `config.window_size` readings. Anything shorter or longer returns
//! `false`, so a caller that gets the lifecycle wrong can miss an alert but
//! never raise a false one.

use crate::channel::{ChannelConfig, PredicateKind};
use crate::traits::TrendPredicate;

/// Alert when the newest reading is more than `threshold` below any earlier one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxDrop {
    /// Degrees of drop that must be exceeded
    pub threshold: f32,
}

impl TrendPredicate for MaxDrop {
    fn holds(&self, window: &[f32]) -> bool {
        let Some((&latest, earlier)) = window.split_last() else {
            return false;
        };

        earlier.iter().any(|&v| v - latest > self.threshold)
    }

    fn magnitude(&self, window: &[f32]) -> Option<f32> {
        let (&latest, earlier) = window.split_last()?;
        earlier.iter().map(|&v| v - latest).reduce(f32::max)
    }
}

/// Alert when the net change across the window is smaller than `threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stall {
    /// Degrees of net change the channel must reach to avoid a stall
    pub threshold: f32,
}

impl TrendPredicate for Stall {
    fn holds(&self, window: &[f32]) -> bool {
        match self.magnitude(window) {
            Some(net) => libm::fabsf(net) < self.threshold,
            None => false,
        }
    }

    fn magnitude(&self, window: &[f32]) -> Option<f32> {
        if window.len() < 2 {
            return None;
        }

        let first = window.first()?;
        let last = window.last()?;
        Some(last - first)
    }
}

/// Alert when any single step between consecutive readings falls by more
/// than `threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDrop {
    /// Degrees of single-step fall that must be exceeded
    pub threshold: f32,
}

impl TrendPredicate for StepDrop {
    fn holds(&self, window: &[f32]) -> bool {
        window.windows(2).any(|pair| pair[0] - pair[1] > self.threshold)
    }

    fn magnitude(&self, window: &[f32]) -> Option<f32> {
        window.windows(2).map(|pair| pair[0] - pair[1]).reduce(f32::max)
    }
}

/// Decide whether `config`'s predicate holds over a full window
///
/// Returns `false` unless `window.len() == config.window_size`.
pub fn evaluate(window: &[f32], config: &ChannelConfig) -> bool {
    if window.len() != config.window_size {
        return false;
    }

    match config.predicate {
        PredicateKind::MaxDrop => MaxDrop { threshold: config.threshold }.holds(window),
        PredicateKind::Stall => Stall { threshold: config.threshold }.holds(window),
        PredicateKind::StepDrop => StepDrop { threshold: config.threshold }.holds(window),
    }
}

/// Size of the change `config`'s predicate measured over `window`
pub fn magnitude(window: &[f32], config: &ChannelConfig) -> Option<f32> {
    match config.predicate {
        PredicateKind::MaxDrop => MaxDrop { threshold: config.threshold }.magnitude(window),
        PredicateKind::Stall => Stall { threshold: config.threshold }.magnitude(window),
        PredicateKind::StepDrop => StepDrop { threshold: config.threshold }.magnitude(window),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(from: f32, to: f32, n: usize) -> Vec<f32> {
        let step = (to - from) / (n - 1) as f32;
        (0..n).map(|i| from + step * i as f32).collect()
    }

    #[test]
    fn smoker_drop_fires() {
        let config = ChannelConfig::smoker();
        assert!(evaluate(&[100.0, 98.0, 90.0, 84.0, 83.0], &config));
    }

    #[test]
    fn smoker_gentle_decline_is_quiet() {
        let config = ChannelConfig::smoker();
        // 100 - 88 = 12
        assert!(!evaluate(&[100.0, 95.0, 92.0, 90.0, 88.0], &config));
    }

    #[test]
    fn max_drop_threshold_is_strict() {
        let config = ChannelConfig::smoker();
        // 100 - 85 = 15, not more than 15
        assert!(!evaluate(&[100.0, 99.0, 98.0, 97.0, 85.0], &config));
    }

    #[test]
    fn max_drop_ignores_rises() {
        let config = ChannelConfig::smoker();
        assert!(!evaluate(&[80.0, 90.0, 100.0, 110.0, 120.0], &config));
    }

    #[test]
    fn max_drop_compares_against_latest_only() {
        // Big fall in the middle, but the latest reading recovered
        let config = ChannelConfig::smoker();
        assert!(!evaluate(&[100.0, 60.0, 70.0, 80.0, 95.0], &config));
    }

    #[test]
    fn stall_fires_on_flat_window() {
        let config = ChannelConfig::food_b();
        assert!(evaluate(&[225.0; 20], &config));
    }

    #[test]
    fn stall_quiet_on_steady_rise() {
        let config = ChannelConfig::food_b();
        assert!(!evaluate(&rising(200.0, 225.0, 20), &config));
    }

    #[test]
    fn stall_uses_magnitude_of_net_change() {
        let config = ChannelConfig::food_b();

        // Falling 25 degrees is movement, not a stall
        assert!(!evaluate(&rising(225.0, 200.0, 20), &config));

        // Barely falling is still a stall
        assert!(evaluate(&rising(225.0, 224.5, 20), &config));
    }

    #[test]
    fn stall_threshold_is_strict() {
        let config = ChannelConfig::food_b();
        let mut window = [200.5; 20];
        window[0] = 200.0;
        window[19] = 201.0;
        assert!(!evaluate(&window, &config));
    }

    #[test]
    fn step_drop_checks_consecutive_pairs() {
        let predicate = StepDrop { threshold: 1.0 };
        assert!(predicate.holds(&[150.0, 151.0, 149.5, 150.0]));
        assert!(!predicate.holds(&[150.0, 149.5, 149.0, 148.5]));
        assert_eq!(predicate.magnitude(&[150.0, 151.0, 149.5, 150.0]), Some(1.5));
    }

    #[test]
    fn partial_window_never_fires() {
        let config = ChannelConfig::smoker();
        assert!(!evaluate(&[100.0, 50.0], &config));
        assert!(!evaluate(&[], &config));

        let config = ChannelConfig::food_b();
        assert!(!evaluate(&[225.0; 19], &config));
    }

    #[test]
    fn short_windows_have_no_magnitude() {
        assert_eq!(MaxDrop { threshold: 1.0 }.magnitude(&[5.0]), None);
        assert_eq!(Stall { threshold: 1.0 }.magnitude(&[5.0]), None);
        assert!(!Stall { threshold: 1.0 }.holds(&[5.0]));
    }

    #[test]
    fn magnitude_reports_largest_drop() {
        let config = ChannelConfig::smoker();
        assert_eq!(magnitude(&[100.0, 98.0, 90.0, 84.0, 83.0], &config), Some(17.0));
    }
}
