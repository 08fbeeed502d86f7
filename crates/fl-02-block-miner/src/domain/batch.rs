//! Batch debounce window.
//!
//! Each submission pushes the deadline to `now + window`, but never past
//! `first + max_wait`, so a steady trickle cannot starve the build.

use crate::config::{BATCH_MAX_WAIT, BATCH_WINDOW};
use std::time::Duration;
use tokio::time::Instant;

/// Debounce state for Batch mode.
#[derive(Debug, Clone)]
pub struct BatchTrigger {
    window: Duration,
    max_wait: Duration,
    first_scheduled: Option<Instant>,
    deadline: Option<Instant>,
}

impl Default for BatchTrigger {
    fn default() -> Self {
        Self::new(BATCH_WINDOW, BATCH_MAX_WAIT)
    }
}

impl BatchTrigger {
    /// Create a trigger with a custom window and upper bound.
    pub fn new(window: Duration, max_wait: Duration) -> Self {
        Self {
            window,
            max_wait,
            first_scheduled: None,
            deadline: None,
        }
    }

    /// Record a submission at `now` and return the new deadline.
    pub fn schedule(&mut self, now: Instant) -> Instant {
        let first = *self.first_scheduled.get_or_insert(now);
        let deadline = (now + self.window).min(first + self.max_wait);
        self.deadline = Some(deadline);
        deadline
    }

    /// Pending deadline, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| d <= now)
    }

    /// Disarm if due, returning whether it fired.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.cancel();
            true
        } else {
            false
        }
    }

    /// Disarm and forget the first submission time.
    pub fn cancel(&mut self) {
        self.first_scheduled = None;
        self.deadline = None;
    }
}
