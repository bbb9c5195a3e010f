use std::fmt;

use crate::{CalendarParts, Clock, Timer};

/// Below this fraction of completed work, extrapolation is considered too noisy to report.
pub const STABILIZATION_FRACTION: f64 = 5.0e-3;

/// Remaining-time predictor for an iterative process.
///
/// The estimator assumes progress is made at a constant rate since the Total timer was
/// started: if moving from `first_progress` to the current progress took the Total timer's
/// elapsed time, the rest of the way to `target_extent` takes proportionally long.
///
/// Nothing is read at construction, so an estimator can be created before the Total timer is
/// started.
///
/// # Examples
///
/// ```
/// use stepwatch::{EtaEstimate, Registry};
///
/// let registry = Registry::new();
/// let eta = registry.eta(0.0, 1000.0);
///
/// // The run has not started yet, so there is nothing to extrapolate from.
/// assert_eq!(eta.estimate(0.0), EtaEstimate::Unavailable);
///
/// registry.total().start();
///
/// // Too little progress to extrapolate from.
/// assert_eq!(eta.estimate(1.0).to_string(), "-");
/// ```
#[derive(Debug)]
pub struct Eta {
    total: Timer,
    first_progress: f64,
    target_extent: f64,
}

/// Outcome of a remaining-time estimate.
///
/// The [`Display`](fmt::Display) implementation renders the form shown in progress lines:
/// an empty string, `-`, or a human-readable duration such as `02m05s`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EtaEstimate {
    /// The Total timer has never been started, or timing is disabled. Renders as `""`.
    Unavailable,

    /// Less than [`STABILIZATION_FRACTION`] of the work is done. Renders as `"-"`.
    Stabilizing,

    /// Expected remaining time.
    Remaining(Clock),
}

impl Eta {
    pub(crate) fn new(total: Timer, first_progress: f64, target_extent: f64) -> Self {
        Self {
            total,
            first_progress,
            target_extent,
        }
    }

    /// Estimates the time left until `current_progress` reaches the target extent.
    ///
    /// Refreshes the Total timer's duration without stopping it.
    #[must_use]
    pub fn estimate(&self, current_progress: f64) -> EtaEstimate {
        if self.total.start_count() == 0 {
            return EtaEstimate::Unavailable;
        }

        let done = current_progress - self.first_progress;
        let fraction = done / self.target_extent;

        if fraction.is_nan() || fraction < STABILIZATION_FRACTION {
            return EtaEstimate::Stabilizing;
        }

        let elapsed = self.total.current_elapsed_seconds();
        let remaining = (((self.target_extent - self.first_progress) / done - 1.0) * elapsed).max(0.0);

        if !remaining.is_finite() {
            return EtaEstimate::Stabilizing;
        }

        EtaEstimate::Remaining(Clock::from_secs_f64(remaining))
    }

    /// The progress value the estimator measures from.
    #[must_use]
    pub fn first_progress(&self) -> f64 {
        self.first_progress
    }

    /// The progress value at which the process is complete.
    #[must_use]
    pub fn target_extent(&self) -> f64 {
        self.target_extent
    }
}

impl EtaEstimate {
    /// The expected remaining time, if one could be estimated.
    #[must_use]
    pub fn remaining(&self) -> Option<Clock> {
        match self {
            Self::Remaining(clock) => Some(*clock),
            Self::Unavailable | Self::Stabilizing => None,
        }
    }
}

impl fmt::Display for EtaEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => Ok(()),
            Self::Stabilizing => f.write_str("-"),
            Self::Remaining(clock) => write!(f, "{}", CalendarParts::from_clock(*clock)),
        }
    }
}
