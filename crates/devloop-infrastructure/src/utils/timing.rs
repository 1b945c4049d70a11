//! Timing instrumentation helpers

use std::time::{Duration, Instant};

/// Tracks the elapsed time of an operation against an optional budget
///
/// # Example
///
/// ```ignore
/// use devloop_infrastructure::utils::TimedOperation;
///
/// let timer = TimedOperation::start();
/// while let Some(remaining) = timer.remaining(budget) {
///     // attempt, then sleep at most `remaining`
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    /// Start a new timed operation
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Elapsed time as Duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left before `budget` runs out, `None` once it is exceeded
    pub fn remaining(&self, budget: Duration) -> Option<Duration> {
        budget.checked_sub(self.start.elapsed())
    }

    /// Whether `budget` has been used up
    pub fn is_expired(&self, budget: Duration) -> bool {
        self.remaining(budget).is_none_or(|r| r.is_zero())
    }
}
