//! Calendar-style decomposition of elapsed durations.

use std::fmt;

use crate::Clock;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
const DAYS_PER_YEAR: u64 = 365;
const SECONDS_PER_YEAR: u64 = DAYS_PER_YEAR * SECONDS_PER_DAY;

/// An elapsed duration split into years, days, hours, minutes and seconds.
///
/// The split uses fixed unit sizes (365-day years, 24-hour days). This is elapsed-time
/// formatting, not calendar arithmetic, so there are no leap years or months. Fractions of a
/// second are dropped and negative durations are treated as zero.
///
/// The [`Display`](fmt::Display) implementation renders the compact human-readable form used
/// in reports and ETA strings. Leading zero units are omitted but seconds are always shown:
///
/// ```
/// use stepwatch::CalendarParts;
///
/// assert_eq!(CalendarParts::from_seconds(45.0).to_string(), "45s");
/// assert_eq!(CalendarParts::from_seconds(125.0).to_string(), "02m05s");
/// assert_eq!(CalendarParts::from_seconds(90_000.0).to_string(), "1d01h00m00s");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CalendarParts {
    /// Whole 365-day years.
    pub years: u64,
    /// Whole days left after removing the years.
    pub days: u64,
    /// Whole hours left after removing the years and days.
    pub hours: u64,
    /// Whole minutes left after removing the years, days and hours.
    pub minutes: u64,
    /// Whole seconds left after removing every coarser unit.
    pub seconds: u64,
}

impl CalendarParts {
    /// Splits a floating point number of seconds.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "clamped to zero first; durations beyond u64 seconds saturate"
    )]
    pub fn from_seconds(seconds: f64) -> Self {
        // NaN also lands on zero here.
        let whole_seconds = if seconds > 0.0 {
            seconds.floor() as u64
        } else {
            0
        };

        Self::from_whole_seconds(whole_seconds)
    }

    /// Splits a clock value interpreted as a duration.
    #[must_use]
    pub fn from_clock(clock: Clock) -> Self {
        Self::from_whole_seconds(u64::try_from(clock.seconds()).unwrap_or(0))
    }

    #[allow(
        clippy::arithmetic_side_effects,
        clippy::integer_division,
        reason = "floor division by non-zero constants; each remainder is smaller than its divisor"
    )]
    fn from_whole_seconds(total: u64) -> Self {
        let years = total / SECONDS_PER_YEAR;
        let remaining = total - years * SECONDS_PER_YEAR;

        let days = remaining / SECONDS_PER_DAY;
        let remaining = remaining - days * SECONDS_PER_DAY;

        let hours = remaining / SECONDS_PER_HOUR;
        let remaining = remaining - hours * SECONDS_PER_HOUR;

        let minutes = remaining / SECONDS_PER_MINUTE;
        let seconds = remaining - minutes * SECONDS_PER_MINUTE;

        Self {
            years,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Reassembles the parts into whole seconds.
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        [
            (self.years, SECONDS_PER_YEAR),
            (self.days, SECONDS_PER_DAY),
            (self.hours, SECONDS_PER_HOUR),
            (self.minutes, SECONDS_PER_MINUTE),
            (self.seconds, 1),
        ]
        .into_iter()
        .map(|(count, unit)| count.saturating_mul(unit))
        .fold(0, u64::saturating_add)
    }
}

impl fmt::Display for CalendarParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Years are shown as days so that multi-year runs keep every digit.
        let days = self
            .years
            .saturating_mul(DAYS_PER_YEAR)
            .saturating_add(self.days);

        if days != 0 {
            write!(f, "{days}d")?;
        }

        if self.hours != 0 || days != 0 {
            write!(f, "{:02}h", self.hours)?;
        }

        if self.minutes != 0 || self.hours != 0 || days != 0 {
            write!(f, "{:02}m", self.minutes)?;
        }

        write!(f, "{:02}s", self.seconds)
    }
}
