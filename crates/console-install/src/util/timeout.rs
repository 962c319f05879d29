//! Deadline tracking on the tokio clock.
//!
//! Built on `tokio::time::Instant` so that tests running with a paused clock
//! see deadlines expire as virtual time advances.

use std::time::Duration;

/// A deadline tracker for operations with multiple steps.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    deadline: tokio::time::Instant,
    budget: Duration,
}

impl Deadline {
    /// Create a new deadline from now.
    #[must_use]
    pub fn from_now(duration: Duration) -> Self {
        Self {
            deadline: tokio::time::Instant::now() + duration,
            budget: duration,
        }
    }

    /// The total duration this deadline was created with.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Check if the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        tokio::time::Instant::now() >= self.deadline
    }

    /// Get the remaining time until the deadline.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline
            .saturating_duration_since(tokio::time::Instant::now())
    }

    /// The smaller of `step` and the remaining time.
    #[must_use]
    pub fn clamp(&self, step: Duration) -> Duration {
        step.min(self.remaining())
    }
}
