use crate::Timer;

/// Keeps a timer running until dropped.
///
/// Returned by [`Timer::span()`]. If the timer was already running when the span was created,
/// dropping the span leaves it running; the cycle belongs to whoever started it.
#[derive(Debug)]
#[must_use = "Measurements are taken between creation and drop"]
pub struct TimerSpan {
    timer: Timer,
    owns_cycle: bool,
}

impl TimerSpan {
    pub(crate) fn new(timer: Timer, owns_cycle: bool) -> Self {
        Self { timer, owns_cycle }
    }

    /// The timer this span keeps running.
    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

impl Drop for TimerSpan {
    fn drop(&mut self) {
        if self.owns_cycle {
            self.timer.stop();
        }
    }
}
