//! Core traits for trend predicates
//!
//! Keep them simple: a predicate looks at a window and says yes or no.

/// Boolean rule applied to a full window of readings
///
/// Implementations must be pure: the same window always yields the same
/// answer, and nothing is mutated.
pub trait TrendPredicate {
    /// Decide whether the alert condition holds
    ///
    /// `window` is ordered oldest to newest. Callers only pass full windows;
    /// an implementation must still answer `false` rather than fire on fewer
    /// than two readings.
    fn holds(&self, window: &[f32]) -> bool;

    /// Degrees by which the window met the condition, for alert messages
    ///
    /// For drop predicates this is the largest drop; for the stall predicate
    /// it is the net change. `None` for windows too short to measure.
    fn magnitude(&self, window: &[f32]) -> Option<f32>;
}
