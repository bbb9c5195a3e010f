//! Named region timers, remaining-time estimates and timing reports for long-running iterative
//! programs such as simulations.
//!
//! The core functionality includes:
//! - [`Registry`] - Owns the named timers of a run, including the distinguished `"Total"` timer
//! - [`Timer`] - Accumulates elapsed time across start/stop cycles
//! - [`Eta`] - Predicts the remaining run time from progress made so far
//! - [`StepRate`] - Measures steps per second between progress updates
//! - [`Report`] - Summarizes all timers as a fixed-width table
//! - [`Clock`] - Nanosecond-precision time value underlying all of the above
//!
//! # Simple usage
//!
//! ```
//! use stepwatch::{Registry, wait};
//!
//! let registry = Registry::new();
//! let total = registry.total();
//! total.start();
//!
//! let eta = registry.eta(0.0, 10.0);
//! let physics = registry.timer("physics");
//! let output = registry.timer("output");
//!
//! for step in 0..10_u32 {
//!     registry.set_step(u64::from(step));
//!
//!     physics.start();
//!     wait(0.001);
//!     physics.stop();
//!
//!     {
//!         let _span = output.span();
//!         // Write a snapshot.
//!     }
//!
//!     println!("step {step}, remaining: {}", eta.estimate(f64::from(step) + 1.0));
//! }
//!
//! registry.stop_all();
//! registry.report(10).print_to_stdout();
//! ```
//!
//! # Step logs
//!
//! When the registry is given an output folder, every timer appends one line per completed
//! cycle to `<folder>/Timing_<name>.csv`, tagged with the current step and the wall-clock start
//! time. See [`strict_name()`] for how timer names map to file names.
//!
//! # Disabling
//!
//! Building the registry with [`RegistryBuilder::enabled(false)`](RegistryBuilder::enabled), or
//! setting `STEPWATCH_DISABLED=1` and using [`RegistryBuilder::from_env()`], turns every timer
//! into a no-op while leaving the instrumentation in place.
//!
//! # Threading
//!
//! A registry and its timers belong to the thread that created them. They are neither `Send`
//! nor `Sync`; create one registry per thread if several threads need timing.
//!
//! # Logging
//!
//! The package emits `tracing` events (registry and step log creation at debug level, timer
//! creation at trace level, a warning when the output folder cannot be created and an error
//! before panicking on a failed step log write). Install any `tracing` subscriber to see them.

mod builder;
mod calendar;
mod clock;
mod error;
mod eta;
mod pal;
mod registry;
mod report;
mod span;
mod step_log;
mod step_rate;
mod timer;
mod wait;

pub use builder::{DISABLED_ENV_VAR, OUTPUT_FOLDER_ENV_VAR, RegistryBuilder};
pub use calendar::CalendarParts;
pub use clock::{Clock, ClockSource};
pub use error::Error;
pub use eta::{Eta, EtaEstimate, STABILIZATION_FRACTION};
pub use registry::{Registry, TOTAL_TIMER_NAME};
pub use report::{Report, ReportRow};
pub use span::TimerSpan;
pub use step_log::strict_name;
pub use step_rate::StepRate;
pub use timer::Timer;
pub use wait::wait;
