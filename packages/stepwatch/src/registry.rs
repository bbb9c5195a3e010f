use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::pal::PlatformFacade;
use crate::step_log::StepLog;
use crate::{ClockSource, Eta, RegistryBuilder, Report, StepRate, Timer, strict_name};

/// Name of the distinguished timer that spans the whole run.
///
/// Reports express every other timer as a share of this one, and ETA estimates extrapolate
/// from its elapsed time.
pub const TOTAL_TIMER_NAME: &str = "Total";

/// State shared by a registry and every timer handle it gives out.
#[derive(Debug)]
pub(crate) struct RegistryContext {
    pub(crate) platform: PlatformFacade,
    pub(crate) clock_source: ClockSource,

    // Written into step log lines.
    pub(crate) step: Cell<u64>,

    // `None` when step logging is off.
    pub(crate) output_folder: Option<PathBuf>,

    // Keyed by file stem. Timers whose names map to the same file share one log.
    step_logs: RefCell<BTreeMap<String, Rc<RefCell<StepLog>>>>,
}

impl RegistryContext {
    /// Returns the step log a new timer called `timer_name` writes to, if step logging is on.
    pub(crate) fn step_log(&self, timer_name: &str) -> Option<Rc<RefCell<StepLog>>> {
        let folder = self.output_folder.as_deref()?;
        let file_stem = strict_name(timer_name);

        let mut step_logs = self.step_logs.borrow_mut();

        if let Some(existing) = step_logs.get(&file_stem) {
            warn!(
                timer = timer_name,
                file = %file_stem,
                "timer name maps to a step log already used by another timer; lines are interleaved"
            );
            return Some(Rc::clone(existing));
        }

        let step_log = Rc::new(RefCell::new(StepLog::new(folder, timer_name)));
        step_logs.insert(file_stem, Rc::clone(&step_log));

        Some(step_log)
    }
}

/// The set of named timers of one program run.
///
/// A registry maps names to [`Timer`] handles, always contains the distinguished `"Total"`
/// timer, and tracks the current step number of the iterative process being measured.
///
/// Timers are created on first lookup and live as long as the registry. Looking up the same
/// name again returns a handle to the same timer, but callers in hot loops are expected to
/// look a timer up once and keep the handle.
///
/// The registry and its timers are single-threaded. Use one registry per thread if several
/// threads need timing.
///
/// # Examples
///
/// ```
/// use stepwatch::Registry;
///
/// let registry = Registry::new();
/// registry.total().start();
///
/// let solve = registry.timer("solve");
/// for step in 0..10 {
///     registry.set_step(step);
///
///     solve.start();
///     // Advance the simulation by one step.
///     solve.stop();
/// }
///
/// registry.stop_all();
/// let report = registry.report(10);
/// assert_eq!(report.rows().len(), 2);
/// ```
#[derive(Debug)]
pub struct Registry {
    context: Rc<RegistryContext>,
    enabled: bool,

    // Includes the Total timer, so iterating the map visits it exactly once.
    timers: RefCell<BTreeMap<String, Timer>>,
    total: Timer,
}

impl Registry {
    /// Creates an enabled registry that samples the monotonic clock and writes no step logs.
    ///
    /// Use [`builder()`](Self::builder) for any other configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a new registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn from_parts(
        platform: PlatformFacade,
        clock_source: ClockSource,
        output_folder: Option<PathBuf>,
        enabled: bool,
    ) -> Self {
        let context = Rc::new(RegistryContext {
            platform,
            clock_source,
            step: Cell::new(0),
            output_folder,
            step_logs: RefCell::new(BTreeMap::new()),
        });

        let total = if enabled {
            Timer::new(TOTAL_TIMER_NAME, &context)
        } else {
            Timer::disabled(TOTAL_TIMER_NAME)
        };

        let mut timers = BTreeMap::new();
        if enabled {
            timers.insert(TOTAL_TIMER_NAME.to_owned(), total.clone());
        }

        debug!(
            enabled,
            ?clock_source,
            output_folder = ?context.output_folder,
            "timer registry created"
        );

        Self {
            context,
            enabled,
            timers: RefCell::new(timers),
            total,
        }
    }

    /// Returns the timer registered under `name`, creating an idle one if it does not exist.
    ///
    /// Asking for [`TOTAL_TIMER_NAME`] returns the same timer as [`total()`](Self::total).
    /// On a disabled registry the returned handle accepts all calls and measures nothing.
    #[must_use]
    pub fn timer(&self, name: &str) -> Timer {
        if !self.enabled {
            return Timer::disabled(name);
        }

        if let Some(timer) = self.timers.borrow().get(name) {
            return timer.clone();
        }

        let timer = Timer::new(name, &self.context);
        self.timers
            .borrow_mut()
            .insert(name.to_owned(), timer.clone());

        timer
    }

    /// The distinguished timer that spans the whole run.
    ///
    /// The registry never starts it on its own. Start it at the beginning of the run and stop
    /// it (or call [`stop_all()`](Self::stop_all)) at the end.
    #[must_use]
    pub fn total(&self) -> Timer {
        self.total.clone()
    }

    /// Stops every running timer, Total included.
    ///
    /// Call this before producing the final report so that every duration is complete.
    pub fn stop_all(&self) {
        // Stopping may write step logs; collect first so no map borrow is held meanwhile.
        let timers: Vec<Timer> = self.timers.borrow().values().cloned().collect();

        for timer in timers {
            timer.stop();
        }
    }

    /// Clears the measurements of every timer and sets the step back to zero.
    ///
    /// Handles held by callers stay valid and observe the cleared state.
    pub fn reset(&self) {
        for timer in self.timers.borrow().values() {
            timer.reset();
        }

        self.context.step.set(0);
    }

    /// Sets the step number that subsequent step log lines are tagged with.
    pub fn set_step(&self, step: u64) {
        self.context.step.set(step);
    }

    /// The current step number.
    #[must_use]
    pub fn step(&self) -> u64 {
        self.context.step.get()
    }

    /// Names of all registered timers in report order: alphabetical, with Total last.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let timers = self.timers.borrow();

        let mut names: Vec<String> = timers
            .keys()
            .filter(|name| name.as_str() != TOTAL_TIMER_NAME)
            .cloned()
            .collect();

        if timers.contains_key(TOTAL_TIMER_NAME) {
            names.push(TOTAL_TIMER_NAME.to_owned());
        }

        names
    }

    /// Handles of all registered timers in report order: alphabetical, with Total last.
    pub(crate) fn timers_in_report_order(&self) -> Vec<Timer> {
        let timers = self.timers.borrow();

        self.names()
            .iter()
            .filter_map(|name| timers.get(name).cloned())
            .collect()
    }

    /// Creates a remaining-time estimator for a process that runs from `first_progress`
    /// towards `target_extent`.
    ///
    /// The estimator extrapolates from the elapsed time of the Total timer, which must be
    /// started at the same moment progress starts being made.
    #[must_use]
    pub fn eta(&self, first_progress: f64, target_extent: f64) -> Eta {
        Eta::new(self.total(), first_progress, target_extent)
    }

    /// Creates a throughput meter whose private timer starts immediately.
    #[must_use]
    pub fn step_rate(&self) -> StepRate {
        let timer = if self.enabled {
            Timer::unlogged("step rate", &self.context)
        } else {
            Timer::disabled("step rate")
        };

        StepRate::new(timer, self.total())
    }

    /// Captures the current durations of all timers as a report.
    ///
    /// `units` is the number of units of work (typically steps) that the per-unit column
    /// divides every duration by. Running timers are sampled without being stopped.
    #[must_use]
    pub fn report(&self, units: u64) -> Report {
        Report::from_timers(&self.timers_in_report_order(), units)
    }

    /// Whether timers from this registry measure anything.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The folder that step logs are written to, if step logging is on.
    #[must_use]
    pub fn output_folder(&self) -> Option<&Path> {
        self.context.output_folder.as_deref()
    }

    /// The clock that timers of this registry sample.
    #[must_use]
    pub fn clock_source(&self) -> ClockSource {
        self.context.clock_source
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fs;

    use super::*;
    use crate::Clock;
    use crate::pal::FakePlatform;

    static_assertions::assert_not_impl_any!(Registry: Send, Sync);

    fn create_test_registry() -> (Registry, FakePlatform) {
        let fake_platform = FakePlatform::new();
        let registry = Registry::builder()
            .platform(PlatformFacade::fake(fake_platform.clone()))
            .build();

        (registry, fake_platform)
    }

    #[test]
    fn contains_total_from_the_start() {
        let (registry, _platform) = create_test_registry();

        assert_eq!(registry.names(), vec![TOTAL_TIMER_NAME.to_owned()]);
        assert_eq!(registry.total().name(), TOTAL_TIMER_NAME);
    }

    #[test]
    fn same_name_returns_same_timer() {
        let (registry, platform) = create_test_registry();

        let first = registry.timer("assembly");
        first.start();
        platform.advance(1.0);

        let second = registry.timer("assembly");
        second.stop();

        assert_eq!(first.start_count(), 1);
        assert!((first.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn total_by_name_is_total() {
        let (registry, _platform) = create_test_registry();

        registry.timer(TOTAL_TIMER_NAME).start();

        assert!(registry.total().is_running());
    }

    #[test]
    fn names_are_alphabetical_with_total_last() {
        let (registry, _platform) = create_test_registry();

        let _c = registry.timer("output");
        let _a = registry.timer("assembly");
        let _b = registry.timer("Zeta");

        assert_eq!(registry.names(), vec!["Zeta", "assembly", "output", "Total"]);
    }

    #[test]
    fn stop_all_stops_everything_once() {
        let (registry, platform) = create_test_registry();

        let total = registry.total();
        let solve = registry.timer("solve");
        let idle = registry.timer("idle");

        total.start();
        solve.start();
        platform.advance(3.0);
        registry.stop_all();

        assert!(!total.is_running());
        assert!(!solve.is_running());
        assert!(!idle.is_running());
        assert!((total.duration_seconds() - 3.0).abs() < 1e-9);
        assert!((solve.duration_seconds() - 3.0).abs() < 1e-9);
        assert_eq!(idle.duration(), Clock::ZERO);
    }

    #[test]
    fn reset_keeps_handles_valid() {
        let (registry, platform) = create_test_registry();
        let solve = registry.timer("solve");

        registry.set_step(9);
        solve.start();
        platform.advance(1.0);
        solve.stop();
        registry.reset();

        assert_eq!(registry.step(), 0);
        assert_eq!(solve.start_count(), 0);

        solve.start();
        platform.advance(2.0);
        solve.stop();

        assert!((registry.timer("solve").duration_seconds() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn step_round_trips() {
        let (registry, _platform) = create_test_registry();

        assert_eq!(registry.step(), 0);
        registry.set_step(1234);
        assert_eq!(registry.step(), 1234);
    }

    #[test]
    fn disabled_registry_registers_nothing() {
        let registry = Registry::builder().enabled(false).build();

        let timer = registry.timer("solve");
        timer.start();
        timer.stop();
        registry.total().start();
        registry.stop_all();

        assert!(!registry.is_enabled());
        assert!(registry.names().is_empty());
        assert!(!timer.is_enabled());
        assert_eq!(registry.total().start_count(), 0);
        assert!(registry.report(1).is_empty());
    }

    #[test]
    fn colliding_file_names_share_one_step_log() {
        let folder = tempfile::tempdir().unwrap();
        let fake_platform = FakePlatform::new();
        let registry = Registry::builder()
            .platform(PlatformFacade::fake(fake_platform.clone()))
            .output_folder(folder.path())
            .build();

        let spaced = registry.timer("fluid solve");
        let dotted = registry.timer("fluid.solve");

        for _ in 0..3 {
            spaced.start();
            fake_platform.advance(1.0);
            spaced.stop();
        }

        registry.set_step(99);
        dotted.start();
        fake_platform.advance(2.0);
        dotted.stop();

        let contents = fs::read_to_string(folder.path().join("Timing_fluid_solve.csv")).unwrap();
        let lines: Vec<_> = contents.lines().collect();

        assert_eq!(lines.len(), 5, "{contents}");
        assert!(lines[0].starts_with("#    Step,"));
        assert_eq!(lines.iter().filter(|line| line.ends_with(", 1.000000000")).count(), 3);
        assert!(lines[4].starts_with("      99, "), "{}", lines[4]);
        assert!(lines[4].ends_with(", 2.000000000"), "{}", lines[4]);
    }

    #[test]
    fn default_configuration() {
        let registry = Registry::default();

        assert!(registry.is_enabled());
        assert_eq!(registry.output_folder(), None);
        assert_eq!(registry.clock_source(), ClockSource::Monotonic);
    }
}
