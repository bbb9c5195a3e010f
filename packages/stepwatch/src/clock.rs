//! Nanosecond-precision clock values.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

pub(crate) const NANOS_PER_SEC: i64 = 1_000_000_000;

// Same value as `NANOS_PER_SEC`, for the floating point paths.
const NANOS_PER_SEC_F64: f64 = 1e9;

/// A point in time or a span of time, stored as whole seconds plus nanoseconds.
///
/// The same type represents both absolute samples from a clock source and the differences
/// between them. Keeping the value as an integer pair avoids the precision loss that a single
/// floating point number would suffer over runs lasting days, while [`as_seconds()`] provides
/// a floating point view for display and ratios.
///
/// The nanosecond part is always normalized to `0..1_000_000_000`. The seconds part may be
/// negative when a later clock is subtracted from an earlier one; no clamping happens here.
///
/// # Examples
///
/// ```
/// use stepwatch::Clock;
///
/// let a = Clock::new(1, 700_000_000);
/// let b = Clock::new(2, 500_000_000);
///
/// let sum = a + b;
/// assert_eq!(sum, Clock::new(4, 200_000_000));
///
/// let difference = b - a;
/// assert_eq!(difference, Clock::new(0, 800_000_000));
/// ```
///
/// [`as_seconds()`]: Self::as_seconds
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Clock {
    seconds: i64,
    nanoseconds: i64,
}

impl Clock {
    /// A clock value of zero seconds.
    pub const ZERO: Self = Self {
        seconds: 0,
        nanoseconds: 0,
    };

    /// Creates a clock value from its two parts.
    ///
    /// # Panics
    ///
    /// Panics if `nanoseconds` is outside `0..1_000_000_000`.
    #[must_use]
    pub const fn new(seconds: i64, nanoseconds: i64) -> Self {
        assert!(
            nanoseconds >= 0 && nanoseconds < NANOS_PER_SEC,
            "nanoseconds must be in 0..1_000_000_000"
        );

        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Creates a clock value from a floating point number of seconds.
    ///
    /// The value is split into `floor(seconds)` whole seconds and the remaining fraction,
    /// truncated to whole nanoseconds. Negative inputs therefore produce negative seconds with
    /// a positive nanosecond part, e.g. `-0.25` becomes `-1 s + 750_000_000 ns`.
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is not finite.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the fraction is below one second, so its nanoseconds always fit"
    )]
    pub fn from_secs_f64(seconds: f64) -> Self {
        assert!(seconds.is_finite(), "cannot represent {seconds} seconds");

        let whole = seconds.floor();
        let nanoseconds = ((seconds - whole) * NANOS_PER_SEC_F64) as i64;

        // Rounding of the fraction can land exactly on the next second.
        if nanoseconds >= NANOS_PER_SEC {
            Self::new((whole as i64).saturating_add(1), 0)
        } else {
            Self::new(whole as i64, nanoseconds.max(0))
        }
    }

    /// The whole-seconds part.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// The nanoseconds part, always in `0..1_000_000_000`.
    #[must_use]
    pub const fn nanoseconds(&self) -> i64 {
        self.nanoseconds
    }

    /// The value as a floating point number of seconds.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "this is the lossy view by definition; the integer parts stay exact"
    )]
    pub fn as_seconds(&self) -> f64 {
        self.seconds as f64 + self.nanoseconds as f64 / NANOS_PER_SEC_F64
    }

    /// Whether the value lies before zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.seconds < 0
    }
}

impl Add for Clock {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut seconds = self
            .seconds
            .checked_add(rhs.seconds)
            .expect("clock seconds overflow i64 - this indicates an unrealistic scenario");

        // Both sides are below one second, so the sum is below two and one carry is enough.
        let mut nanoseconds = self
            .nanoseconds
            .checked_add(rhs.nanoseconds)
            .expect("guarded by normalization invariant");

        if nanoseconds >= NANOS_PER_SEC {
            seconds = seconds
                .checked_add(1)
                .expect("clock seconds overflow i64 - this indicates an unrealistic scenario");
            nanoseconds = nanoseconds
                .checked_sub(NANOS_PER_SEC)
                .expect("guarded by if condition");
        }

        Self {
            seconds,
            nanoseconds,
        }
    }
}

impl Sub for Clock {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let seconds = self
            .seconds
            .checked_sub(rhs.seconds)
            .expect("clock seconds overflow i64 - this indicates an unrealistic scenario");

        let nanoseconds = self
            .nanoseconds
            .checked_sub(rhs.nanoseconds)
            .expect("guarded by normalization invariant");

        if nanoseconds < 0 {
            Self {
                seconds: seconds
                    .checked_sub(1)
                    .expect("clock seconds overflow i64 - this indicates an unrealistic scenario"),
                nanoseconds: nanoseconds
                    .checked_add(NANOS_PER_SEC)
                    .expect("guarded by normalization invariant"),
            }
        } else {
            Self {
                seconds,
                nanoseconds,
            }
        }
    }
}

/// Which clock a timer samples.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ClockSource {
    /// Monotonic wall time. Includes time spent sleeping or blocked.
    #[default]
    Monotonic,

    /// Processor time consumed by all threads of the current process. Time spent sleeping
    /// (e.g. in [`wait()`](crate::wait)) is not counted.
    ProcessCpu,
}

impl From<Duration> for Clock {
    fn from(duration: Duration) -> Self {
        Self {
            seconds: i64::try_from(duration.as_secs())
                .expect("duration exceeds i64 seconds - this indicates an unrealistic scenario"),
            nanoseconds: i64::from(duration.subsec_nanos()),
        }
    }
}

impl TryFrom<Clock> for Duration {
    type Error = Clock;

    /// Converts a non-negative clock value into a [`Duration`], returning the clock back if
    /// it is negative.
    fn try_from(clock: Clock) -> Result<Self, Self::Error> {
        let seconds = u64::try_from(clock.seconds).map_err(|_| clock)?;
        let nanoseconds = u32::try_from(clock.nanoseconds).expect("guarded by normalization invariant");

        Ok(Self::new(seconds, nanoseconds))
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            let magnitude = Self::ZERO - *self;
            write!(f, "-{}.{:09}", magnitude.seconds, magnitude.nanoseconds)
        } else {
            write!(f, "{}.{:09}", self.seconds, self.nanoseconds)
        }
    }
}
