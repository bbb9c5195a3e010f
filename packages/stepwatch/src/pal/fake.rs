//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};

use crate::Clock;
use crate::pal::abstractions::Platform;

#[derive(Debug)]
struct FakePlatformState {
    monotonic_time: Clock,
    process_time: Clock,
}

/// Fake implementation of the platform abstraction for testing.
///
/// Clones share the same underlying state, so a test can keep one clone and move the clocks
/// forward while the code under test samples through another.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    /// Creates a new fake platform with both clocks at zero.
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePlatformState {
                monotonic_time: Clock::ZERO,
                process_time: Clock::ZERO,
            })),
        }
    }

    pub(crate) fn set_monotonic_time(&self, time: Clock) {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .monotonic_time = time;
    }

    pub(crate) fn set_process_time(&self, time: Clock) {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .process_time = time;
    }

    /// Moves both clocks forward by the given number of seconds.
    pub(crate) fn advance(&self, seconds: f64) {
        let delta = Clock::from_secs_f64(seconds);
        let mut state = self
            .state
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        state.monotonic_time = state.monotonic_time + delta;
        state.process_time = state.process_time + delta;
    }
}

impl Platform for FakePlatform {
    fn monotonic_time(&self) -> Clock {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .monotonic_time
    }

    fn process_time(&self) -> Clock {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .process_time
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_time() {
        let platform = FakePlatform::new();
        assert_eq!(platform.monotonic_time(), Clock::ZERO);
        assert_eq!(platform.process_time(), Clock::ZERO);
    }

    #[test]
    fn advance_moves_both_clocks() {
        let platform = FakePlatform::new();
        platform.set_process_time(Clock::new(1, 0));
        platform.advance(2.5);

        assert_eq!(platform.monotonic_time(), Clock::new(2, 500_000_000));
        assert_eq!(platform.process_time(), Clock::new(3, 500_000_000));
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_monotonic_time(Clock::new(100, 0));
        assert_eq!(platform2.monotonic_time(), Clock::new(100, 0));
    }
}
