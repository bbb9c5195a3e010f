use std::thread;
use std::time::Duration;

/// Blocks the calling thread for `seconds`.
///
/// Useful for simulating work in examples and tests. The sleep shows up on timers that sample
/// [`ClockSource::Monotonic`](crate::ClockSource::Monotonic) but not on timers that sample
/// processor time.
///
/// # Panics
///
/// Panics if `seconds` is negative, not finite or too large to represent as a [`Duration`].
///
/// # Examples
///
/// ```
/// use stepwatch::{Registry, wait};
///
/// let registry = Registry::new();
/// let timer = registry.timer("simulated work");
///
/// timer.start();
/// wait(0.01);
/// timer.stop();
///
/// assert!(timer.duration_seconds() >= 0.01);
/// ```
pub fn wait(seconds: f64) {
    let duration = Duration::try_from_secs_f64(seconds)
        .unwrap_or_else(|e| panic!("cannot wait for {seconds} seconds: {e}"));

    thread::sleep(duration);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    #[cfg_attr(miri, ignore)] // Real sleeping is too slow under Miri.
    fn sleeps_at_least_the_requested_time() {
        let before = Instant::now();
        wait(0.02);

        assert!(before.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn zero_returns() {
        wait(0.0);
    }

    #[test]
    #[should_panic]
    fn negative_panics() {
        wait(-1.0);
    }

    #[test]
    #[should_panic]
    fn nan_panics() {
        wait(f64::NAN);
    }
}
