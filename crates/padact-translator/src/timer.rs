//! Monotonic deadline tracking for per-mapping repeat/reset delays.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A source of monotonic time. `SystemClock` is the production implementation;
/// `FakeClock` (behind `test-util`) lets tests advance time without sleeping.
pub trait Clock: fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wraps `std::time::Instant::now()`. The default clock for `KeyboardActionTranslator`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only advances when told to. Useful for deterministic timer tests.
///
/// Cloning a `FakeClock` shares its underlying offset cell (via `Rc`), so a
/// clock handed to `KeyboardActionTranslator::with_clock` can still be
/// advanced from the test that constructed it by keeping a clone around.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone)]
pub struct FakeClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

#[cfg(any(test, feature = "test-util"))]
impl FakeClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

/// Tracks a single deadline against a `Clock`. Not thread-safe; a `KeyboardActionTranslator`
/// is single-threaded per instance, and so is every `Timer` it owns.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    deadline: Instant,
    last_duration: Duration,
}

impl Timer {
    /// Creates a timer whose deadline is already elapsed, with `duration` as the value
    /// a parameterless `reset()` will reuse.
    pub fn new(now: Instant, duration: Duration) -> Self {
        Self {
            deadline: now,
            last_duration: duration,
        }
    }

    /// Sets the deadline to `now + duration` and remembers `duration` for future bare resets.
    pub fn reset_with(&mut self, now: Instant, duration: Duration) {
        self.deadline = now + duration;
        self.last_duration = duration;
    }

    /// Re-arms the timer using the last duration passed to `reset_with`.
    pub fn reset(&mut self, now: Instant) {
        self.reset_with(now, self.last_duration);
    }

    /// True iff `now` is at or past the deadline.
    pub fn is_elapsed(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_timer_reset_with_zero_duration_is_immediately_elapsed() {
        let clock = FakeClock::new();
        let timer = Timer::new(clock.now(), Duration::ZERO);
        assert!(timer.is_elapsed(clock.now()));
    }

    #[test]
    fn timer_is_not_elapsed_before_duration_passes() {
        let clock = FakeClock::new();
        let mut timer = Timer::new(clock.now(), Duration::from_millis(100));
        timer.reset(clock.now());
        assert!(!timer.is_elapsed(clock.now()));
        clock.advance(Duration::from_millis(99));
        assert!(!timer.is_elapsed(clock.now()));
        clock.advance(Duration::from_millis(1));
        assert!(timer.is_elapsed(clock.now()));
    }

    #[test]
    fn reset_without_duration_reuses_last_duration() {
        let clock = FakeClock::new();
        let mut timer = Timer::new(clock.now(), Duration::ZERO);
        timer.reset_with(clock.now(), Duration::from_millis(50));
        clock.advance(Duration::from_millis(50));
        assert!(timer.is_elapsed(clock.now()));
        timer.reset(clock.now());
        assert!(!timer.is_elapsed(clock.now()));
        clock.advance(Duration::from_millis(50));
        assert!(timer.is_elapsed(clock.now()));
    }
}
