//! Real platform implementation using operating system clocks.

use crate::Clock;
use crate::pal::abstractions::Platform;

/// Real implementation of the platform abstraction.
///
/// On Unix both clocks are read through `clock_gettime()`. Elsewhere the monotonic clock is
/// derived from [`std::time::Instant`] relative to the first sample taken by the process and
/// processor time comes from the `cpu_time` package.
#[derive(Debug, Clone)]
pub(crate) struct RealPlatform;

impl Platform for RealPlatform {
    fn monotonic_time(&self) -> Clock {
        sys::monotonic_time()
    }

    fn process_time(&self) -> Clock {
        sys::process_time()
    }
}

#[cfg(unix)]
mod sys {
    use std::{io, mem};

    use libc::{CLOCK_MONOTONIC, CLOCK_PROCESS_CPUTIME_ID, clockid_t, timespec};
    use tracing::error;

    use crate::Clock;

    pub(super) fn monotonic_time() -> Clock {
        clock_gettime(CLOCK_MONOTONIC, "monotonic")
    }

    pub(super) fn process_time() -> Clock {
        clock_gettime(CLOCK_PROCESS_CPUTIME_ID, "process CPU")
    }

    fn clock_gettime(clock_id: clockid_t, clock_name: &str) -> Clock {
        // SAFETY: All-zero is a valid initial value for this type.
        let mut ts: timespec = unsafe { mem::zeroed() };

        // SAFETY: We are passing valid arguments, no other safety requirements.
        let result = unsafe { libc::clock_gettime(clock_id, &raw mut ts) };

        if result != 0 {
            let os_error = io::Error::last_os_error();
            error!(clock = clock_name, %os_error, "clock_gettime() failed");
            panic!("failed to sample the {clock_name} clock: {os_error}");
        }

        #[allow(
            clippy::useless_conversion,
            reason = "time_t and c_long are not i64 on every Unix target"
        )]
        let (seconds, nanoseconds) = (i64::from(ts.tv_sec), i64::from(ts.tv_nsec));

        Clock::new(seconds, nanoseconds)
    }
}

#[cfg(not(unix))]
mod sys {
    use std::sync::LazyLock;
    use std::time::Instant;

    use cpu_time::ProcessTime;

    use crate::Clock;

    static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

    pub(super) fn monotonic_time() -> Clock {
        Clock::from(EPOCH.elapsed())
    }

    pub(super) fn process_time() -> Clock {
        Clock::from(ProcessTime::now().as_duration())
    }
}

#[cfg(test)]
#[cfg(not(miri))] // Miri cannot talk to the real platform.
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::hint::black_box;

    use super::*;

    #[test]
    fn samples_are_normalized() {
        let platform = RealPlatform;

        for clock in [platform.monotonic_time(), platform.process_time()] {
            assert!((0..1_000_000_000).contains(&clock.nanoseconds()));
            assert!(!clock.is_negative());
        }
    }

    #[test]
    fn process_time_advances_with_work() {
        let platform = RealPlatform;
        let before = platform.process_time();

        let mut accumulator = 0_u64;
        for i in 0..5_000_000_u64 {
            accumulator = black_box(accumulator.wrapping_mul(31).wrapping_add(i));
        }

        let after = platform.process_time();
        assert!(after >= before);
    }
}
