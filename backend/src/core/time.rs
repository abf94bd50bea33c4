//! Time management for the simulation
//!
//! The simulation operates in discrete ticks. Every active actor accrues
//! turn meter once per tick; at most one actor takes a turn per tick.
//! The clock lives inside a single simulation and is never shared.

use serde::{Deserialize, Serialize};

/// Counts discrete simulation ticks
///
/// # Example
/// ```
/// use speed_tune_core_rs::TickClock;
///
/// let mut clock = TickClock::new();
/// assert_eq!(clock.current_tick(), 0);
///
/// clock.advance_tick();
/// assert_eq!(clock.current_tick(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickClock {
    /// Total ticks elapsed since simulation start
    current_tick: usize,
}

impl TickClock {
    /// Create a clock at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by one tick
    ///
    /// # Example
    /// ```
    /// use speed_tune_core_rs::TickClock;
    ///
    /// let mut clock = TickClock::new();
    /// for _ in 0..7 {
    ///     clock.advance_tick();
    /// }
    /// assert_eq!(clock.current_tick(), 7);
    /// ```
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Get the current tick (total ticks since start)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Ticks elapsed since an earlier reading of this clock
    pub fn ticks_since(&self, earlier: usize) -> usize {
        self.current_tick.saturating_sub(earlier)
    }
}
