//! Named start/stop duration accumulators.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Local};
use tracing::{error, trace};

use crate::pal::Platform;
use crate::registry::RegistryContext;
use crate::step_log::StepLog;
use crate::{CalendarParts, Clock, TimerSpan};

/// A named accumulator of elapsed time across one or more start/stop cycles.
///
/// A `Timer` is a cheap handle: clones refer to the same underlying measurements, so callers
/// are expected to look a timer up once via [`Registry::timer()`] and keep the handle around
/// for the whole loop it instruments.
///
/// The timer is either idle or running. [`start()`] moves it to running and [`stop()`] adds
/// the elapsed time of the cycle to the accumulated duration. Both are no-ops when the timer
/// is already in the target state, so a second `start()` does not reset the start sample.
///
/// Handles obtained from a disabled registry accept every call and measure nothing.
///
/// # Examples
///
/// ```
/// use stepwatch::Registry;
///
/// let registry = Registry::new();
/// let assembly = registry.timer("assembly");
///
/// for _ in 0..3 {
///     assembly.start();
///     // Assemble the system of equations.
///     assembly.stop();
/// }
///
/// assert_eq!(assembly.start_count(), 3);
/// assert!(assembly.duration_seconds() >= 0.0);
/// ```
///
/// [`Registry::timer()`]: crate::Registry::timer
/// [`start()`]: Self::start
/// [`stop()`]: Self::stop
#[derive(Clone)]
pub struct Timer {
    name: Rc<str>,
    inner: Option<Rc<TimerInner>>,
}

struct TimerInner {
    context: Rc<RegistryContext>,
    state: RefCell<TimerState>,
}

#[derive(Debug, Default)]
struct TimerState {
    is_running: bool,
    start: Clock,
    end: Clock,

    // Sum of all completed cycles.
    completed: Clock,

    // Reported duration: `completed` plus the current cycle as of the last sample.
    duration: Clock,

    start_count: u64,

    // Only captured when a step log is attached.
    started_at: Option<DateTime<Local>>,
    step_log: Option<Rc<RefCell<StepLog>>>,
}

impl Timer {
    pub(crate) fn new(name: &str, context: &Rc<RegistryContext>) -> Self {
        let step_log = context.step_log(name);

        Self::with_step_log(name, context, step_log)
    }

    // For internal helper timers that must never produce a step log file.
    pub(crate) fn unlogged(name: &str, context: &Rc<RegistryContext>) -> Self {
        Self::with_step_log(name, context, None)
    }

    fn with_step_log(
        name: &str,
        context: &Rc<RegistryContext>,
        step_log: Option<Rc<RefCell<StepLog>>>,
    ) -> Self {
        trace!(timer = name, logged = step_log.is_some(), "timer created");

        Self {
            name: Rc::from(name),
            inner: Some(Rc::new(TimerInner {
                context: Rc::clone(context),
                state: RefCell::new(TimerState {
                    step_log,
                    ..TimerState::default()
                }),
            })),
        }
    }

    pub(crate) fn disabled(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            inner: None,
        }
    }

    /// The name the timer was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this handle measures anything. Handles from a disabled registry do not.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Starts a new cycle. Does nothing if the timer is already running.
    pub fn start(&self) {
        let Some(inner) = &self.inner else {
            return;
        };

        let mut state = inner.state.borrow_mut();
        if state.is_running {
            return;
        }

        state.start = inner.now();
        state.is_running = true;
        state.start_count = state
            .start_count
            .checked_add(1)
            .expect("start count overflows u64 - this indicates an unrealistic scenario");

        if state.step_log.is_some() {
            state.started_at = Some(Local::now());
        }
    }

    /// Ends the current cycle and adds its duration to the total. Does nothing if the timer
    /// is idle.
    ///
    /// When the owning registry has an output folder, a line describing the cycle is appended
    /// to the timer's step log.
    ///
    /// # Panics
    ///
    /// Panics if the step log cannot be created or written. Silently losing part of the timing
    /// record is worse than stopping the run.
    pub fn stop(&self) {
        let Some(inner) = &self.inner else {
            return;
        };

        let mut state = inner.state.borrow_mut();
        if !state.is_running {
            return;
        }

        state.end = inner.now();
        let cycle = state.end - state.start;

        state.completed = state.completed + cycle;
        state.duration = state.completed;
        state.is_running = false;

        let step = inner.context.step.get();
        let started_at = state.started_at.take();

        let (Some(step_log), Some(started_at)) = (state.step_log.as_ref(), started_at) else {
            return;
        };

        if let Err(e) = step_log.borrow_mut().append(step, &started_at, cycle) {
            error!(timer = %self.name, error = %e, "step log write failed");
            panic!("timer '{}' cannot record its step log: {e}", self.name);
        }
    }

    /// Refreshes the reported duration of a running timer without stopping it.
    ///
    /// Each call takes a new end sample. For an idle timer the reported duration is simply
    /// the sum of its completed cycles.
    pub fn update_duration(&self) {
        let Some(inner) = &self.inner else {
            return;
        };

        let mut state = inner.state.borrow_mut();

        if state.is_running {
            state.end = inner.now();
            state.duration = state.completed + (state.end - state.start);
        } else {
            state.duration = state.completed;
        }
    }

    /// Adds a synthetic amount of elapsed time without waiting for it to pass.
    ///
    /// The amount goes straight into the accumulated duration, so a fresh timer reports exactly
    /// `seconds` afterwards. On a running timer it is kept on top of the current cycle and
    /// survives later calls to [`update_duration()`](Self::update_duration) and
    /// [`stop()`](Self::stop).
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is not finite.
    pub fn add_seconds(&self, seconds: f64) {
        let Some(inner) = &self.inner else {
            return;
        };

        let delta = Clock::from_secs_f64(seconds);
        let mut state = inner.state.borrow_mut();

        state.completed = state.completed + delta;

        state.duration = if state.is_running {
            // The end sample may still belong to the previous cycle.
            let current_cycle = state.end.max(state.start) - state.start;
            state.completed + current_cycle
        } else {
            state.completed
        };
    }

    /// Clears all measurements and returns the timer to the idle state.
    ///
    /// The step log file, if any, stays open and keeps receiving lines.
    pub fn reset(&self) {
        let Some(inner) = &self.inner else {
            return;
        };

        let mut state = inner.state.borrow_mut();
        let step_log = state.step_log.take();

        *state = TimerState {
            step_log,
            ..TimerState::default()
        };
    }

    /// Starts the timer and returns a guard that stops it again when dropped.
    ///
    /// If the timer is already running, the guard leaves it running on drop so that the outer
    /// cycle is not cut short.
    ///
    /// # Examples
    ///
    /// ```
    /// use stepwatch::Registry;
    ///
    /// let registry = Registry::new();
    /// let output = registry.timer("output");
    ///
    /// {
    ///     let _span = output.span();
    ///     // Write a snapshot.
    /// }
    ///
    /// assert!(!output.is_running());
    /// assert_eq!(output.start_count(), 1);
    /// ```
    pub fn span(&self) -> TimerSpan {
        let owns_cycle = self.is_enabled() && !self.is_running();
        self.start();

        TimerSpan::new(self.clone(), owns_cycle)
    }

    /// Whether a cycle is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.read(|state| state.is_running)
    }

    /// How many cycles have been started.
    #[must_use]
    pub fn start_count(&self) -> u64 {
        self.read(|state| state.start_count)
    }

    /// The accumulated duration as of the last [`stop()`] or [`update_duration()`].
    ///
    /// [`stop()`]: Self::stop
    /// [`update_duration()`]: Self::update_duration
    #[must_use]
    pub fn duration(&self) -> Clock {
        self.read(|state| state.duration)
    }

    /// The accumulated duration in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.duration().as_seconds()
    }

    /// Refreshes and returns the elapsed seconds, leaving a running timer running.
    #[must_use]
    pub fn current_elapsed_seconds(&self) -> f64 {
        self.update_duration();
        self.duration_seconds()
    }

    /// The accumulated duration split into years, days, hours, minutes and seconds.
    #[must_use]
    pub fn calendar_parts(&self) -> CalendarParts {
        CalendarParts::from_clock(self.duration())
    }

    /// The accumulated duration in compact human-readable form, e.g. `02m05s`.
    #[must_use]
    pub fn human_readable(&self) -> String {
        self.calendar_parts().to_string()
    }

    fn read<R: Default>(&self, f: impl FnOnce(&TimerState) -> R) -> R {
        self.inner
            .as_ref()
            .map(|inner| f(&inner.state.borrow()))
            .unwrap_or_default()
    }
}

impl TimerInner {
    fn now(&self) -> Clock {
        self.context.platform.now(self.context.clock_source)
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Timer");
        debug.field("name", &self.name);

        match &self.inner {
            Some(inner) => {
                let state = inner.state.borrow();
                debug
                    .field("is_running", &state.is_running)
                    .field("start_count", &state.start_count)
                    .field("duration", &state.duration)
                    .finish_non_exhaustive()
            }
            None => debug.field("enabled", &false).finish(),
        }
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.human_readable())
    }
}
