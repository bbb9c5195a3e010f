use crate::Timer;

// Intervals shorter than this are too coarse to divide by.
const MIN_INTERVAL_SECONDS: f64 = 1e-5;

/// Throughput meter reporting how many steps per second an iterative process completes.
///
/// The meter owns a private timer that starts when the meter is created via
/// [`Registry::step_rate()`]. Each query with a step number greater than the previous one
/// closes an interval; the rate is the number of steps covered by the latest interval divided
/// by its length. Querying again with the same step number repeats the previous answer.
///
/// # Examples
///
/// ```
/// use stepwatch::Registry;
///
/// let registry = Registry::new();
/// let mut rate = registry.step_rate();
///
/// for step in 0..100 {
///     // Advance the simulation by one step.
///     if step % 10 == 0 {
///         let steps_per_second = rate.steps_per_second(step);
///         assert!(steps_per_second >= 0.0);
///     }
/// }
/// ```
///
/// [`Registry::step_rate()`]: crate::Registry::step_rate
#[derive(Debug)]
pub struct StepRate {
    timer: Timer,
    total: Timer,

    previous_step: Option<u64>,
    previous_elapsed: f64,

    // The latest closed interval.
    interval_seconds: f64,
    interval_steps: u64,
}

impl StepRate {
    pub(crate) fn new(timer: Timer, total: Timer) -> Self {
        timer.start();

        Self {
            timer,
            total,
            previous_step: None,
            previous_elapsed: 0.0,
            interval_seconds: 0.0,
            interval_steps: 0,
        }
    }

    /// Closes the current interval at `step`, if `step` is past the previously seen step.
    ///
    /// The first interval counts step zero as covered, so the first update at step `n` covers
    /// `n + 1` steps.
    pub fn update(&mut self, step: u64) {
        let covered = match self.previous_step {
            None => step.saturating_add(1),
            Some(previous) if step > previous => step.saturating_sub(previous),
            Some(_) => return,
        };

        let elapsed = self.timer.current_elapsed_seconds();

        self.interval_seconds = elapsed - self.previous_elapsed;
        self.interval_steps = covered;
        self.previous_elapsed = elapsed;
        self.previous_step = Some(step);
    }

    /// Steps completed per second over the latest interval, or `0.0` if it is too short to
    /// measure.
    #[expect(
        clippy::cast_precision_loss,
        reason = "step counts beyond 2^52 per interval are unrealistic"
    )]
    pub fn steps_per_second(&mut self, step: u64) -> f64 {
        self.update(step);

        if self.interval_steps == 0 || self.interval_seconds.abs() < MIN_INTERVAL_SECONDS {
            return 0.0;
        }

        self.interval_steps as f64 / self.interval_seconds
    }

    /// Seconds spent per step over the latest interval, or `0.0` if no rate is known.
    pub fn seconds_per_step(&mut self, step: u64) -> f64 {
        let rate = self.steps_per_second(step);

        if rate > 0.0 { rate.recip() } else { 0.0 }
    }

    /// Average steps per second over the whole run so far, measured by the Total timer.
    ///
    /// Returns `0.0` while the Total timer has no elapsed time.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "step counts beyond 2^52 are unrealistic"
    )]
    pub fn total_steps_per_second(&self, last_step: u64) -> f64 {
        let elapsed = self.total.current_elapsed_seconds();

        if elapsed > 0.0 {
            last_step as f64 / elapsed
        } else {
            0.0
        }
    }
}
