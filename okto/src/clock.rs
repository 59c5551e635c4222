//! Wall-clock pacing for the delay and sound timers.
//!
//! The interpreter core is driven by the host calling [`crate::Chip8::step`]
//! at whatever rate it likes; the [`Clock`] converts real elapsed time into a
//! count of whole timer periods so the timers tick at their configured rate
//! (60 Hz by default) regardless of how often `step` runs. Unconsumed time is
//! carried forward, so a slow host catches up instead of drifting.

use std::time::{Duration, Instant};

/// Converts elapsed wall-clock time into whole timer periods.
pub struct Clock {
    period: Duration,
    last_tick: Instant,
}

impl Clock {
    /// Create a clock ticking `hz` times per second.
    ///
    /// # Panics
    ///
    /// Panics if `hz` is zero.
    #[must_use]
    pub fn new(hz: u32) -> Self {
        assert!(hz > 0, "clock rate must be nonzero");
        Self {
            period: Duration::from_secs(1) / hz,
            last_tick: Instant::now(),
        }
    }

    /// Number of whole periods elapsed since the last call, measured at
    /// `now`. The reference point advances by exactly the periods returned,
    /// so fractional remainders accumulate toward the next call.
    pub fn advance(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last_tick);
        let periods = (elapsed.as_nanos() / self.period.as_nanos()) as u32;
        self.last_tick += self.period * periods;
        periods
    }

    /// [`Self::advance`] against the current wall clock.
    pub fn tick(&mut self) -> u32 {
        self.advance(Instant::now())
    }

    /// Reset the reference point so time spent paused is not replayed as a
    /// burst of ticks.
    pub fn restart(&mut self) {
        self.last_tick = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_periods_before_first_boundary() {
        let mut clock = Clock::new(60);
        let start = Instant::now();
        clock.last_tick = start;
        assert_eq!(clock.advance(start + Duration::from_millis(10)), 0);
    }

    #[test]
    fn counts_whole_periods() {
        let mut clock = Clock::new(60);
        let start = Instant::now();
        clock.last_tick = start;
        // Three full 60 Hz periods and a bit of change.
        assert_eq!(clock.advance(start + Duration::from_millis(51)), 3);
    }

    #[test]
    fn remainder_carries_forward() {
        let mut clock = Clock::new(60);
        let start = Instant::now();
        clock.last_tick = start;
        assert_eq!(clock.advance(start + Duration::from_millis(10)), 0);
        // 10 ms + 10 ms crosses the ~16.7 ms boundary once.
        assert_eq!(clock.advance(start + Duration::from_millis(20)), 1);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = Clock::new(60);
        let start = Instant::now();
        clock.last_tick = start + Duration::from_secs(1);
        assert_eq!(clock.advance(start), 0);
    }
}
