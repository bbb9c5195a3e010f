//! Platform abstraction trait definitions.

use std::fmt::Debug;

use crate::{Clock, ClockSource};

/// Provides the raw clock samples that timers are built from.
///
/// Implementations panic if the underlying clock cannot be read. A broken time source makes
/// every further measurement meaningless, so there is no error path to recover through.
pub(crate) trait Platform: Debug + 'static {
    /// Samples the monotonic clock.
    fn monotonic_time(&self) -> Clock;

    /// Samples the processor time consumed by the current process.
    fn process_time(&self) -> Clock;

    /// Samples whichever clock `source` selects.
    fn now(&self, source: ClockSource) -> Clock {
        match source {
            ClockSource::Monotonic => self.monotonic_time(),
            ClockSource::ProcessCpu => self.process_time(),
        }
    }
}
