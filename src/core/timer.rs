//! Countdown Timer
//!
//! The cooldown primitive behind every gated action: ability cooldowns,
//! knockback windows, intermissions, regen delays, reignite timers.
//! Time is in seconds and only moves when the owner calls [`Cooldown::tick`].

use serde::{Serialize, Deserialize};

/// Countdown with a remaining/max pair.
///
/// # Example
///
/// ```
/// use tidecaller::core::timer::Cooldown;
///
/// let mut cooldown = Cooldown::new(5.0);
/// cooldown.restart();
/// for _ in 0..3 {
///     cooldown.tick(1.0);
/// }
/// assert_eq!(cooldown.remaining(), 2.0);
/// assert!(!cooldown.is_ready());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    remaining: f32,
    max: f32,
}

impl Cooldown {
    /// Create an idle (ready) timer with the given length.
    pub fn new(max: f32) -> Self {
        Self {
            remaining: 0.0,
            max: sanitize(max),
        }
    }

    /// Create a timer that is already running at full length.
    pub fn running(max: f32) -> Self {
        let mut timer = Self::new(max);
        timer.restart();
        timer
    }

    /// Set a new length and start counting down from it.
    pub fn start(&mut self, max: f32) {
        self.max = sanitize(max);
        self.remaining = self.max;
    }

    /// Start counting down from the current length.
    #[inline]
    pub fn restart(&mut self) {
        self.remaining = self.max;
    }

    /// Advance by `dt` seconds. Never goes below zero.
    #[inline]
    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    /// Stop the countdown immediately.
    #[inline]
    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    /// Change the length without touching the running countdown.
    pub fn set_max(&mut self, max: f32) {
        self.max = sanitize(max);
        self.remaining = self.remaining.min(self.max);
    }

    /// True once the countdown has elapsed.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Seconds left on the countdown.
    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Configured length.
    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Remaining share of the full length in `[0, 1]` (0 when max is 0).
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.max).clamp(0.0, 1.0)
    }
}

fn sanitize(max: f32) -> f32 {
    if max.is_finite() && max > 0.0 {
        max
    } else {
        0.0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_timer_is_ready() {
        let timer = Cooldown::new(3.0);
        assert!(timer.is_ready());
        assert_eq!(timer.remaining(), 0.0);
        assert_eq!(timer.max(), 3.0);
    }

    #[test]
    fn test_cooldown_scenario() {
        let mut timer = Cooldown::new(5.0);
        timer.restart();
        timer.tick(1.0);
        timer.tick(1.0);
        timer.tick(1.0);

        assert_eq!(timer.remaining(), 2.0);
        assert!(!timer.is_ready());
        assert_eq!(timer.fraction(), 0.4);
    }

    #[test]
    fn test_tick_clamps_at_zero() {
        let mut timer = Cooldown::running(1.0);
        timer.tick(5.0);
        assert_eq!(timer.remaining(), 0.0);
        assert!(timer.is_ready());
        assert_eq!(timer.fraction(), 0.0);
    }

    #[test]
    fn test_clear_stops_countdown() {
        let mut timer = Cooldown::running(4.0);
        timer.clear();
        assert!(timer.is_ready());
        assert_eq!(timer.max(), 4.0);
    }

    #[test]
    fn test_zero_max_is_always_ready() {
        let mut timer = Cooldown::new(0.0);
        timer.restart();
        assert!(timer.is_ready());
        assert_eq!(timer.fraction(), 0.0);

        timer.start(-2.0);
        assert!(timer.is_ready());
        assert_eq!(timer.max(), 0.0);
    }

    #[test]
    fn test_set_max_shrinks_running_countdown() {
        let mut timer = Cooldown::running(10.0);
        timer.set_max(4.0);
        assert_eq!(timer.remaining(), 4.0);
        assert_eq!(timer.max(), 4.0);
    }

    proptest! {
        #[test]
        fn prop_fraction_in_unit_range(max in 0.0f32..100.0, ticks in proptest::collection::vec(0.0f32..3.0, 0..20)) {
            let mut timer = Cooldown::running(max);
            for dt in ticks {
                timer.tick(dt);
                prop_assert!(timer.remaining() >= 0.0);
                prop_assert!(timer.remaining() <= timer.max());
                let fraction = timer.fraction();
                prop_assert!((0.0..=1.0).contains(&fraction));
            }
        }
    }
}
