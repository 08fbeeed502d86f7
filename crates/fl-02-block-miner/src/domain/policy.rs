//! How each mode reacts to pool activity.

use crate::config::MinerMode;

/// Scheduler reaction to a pool submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolReaction {
    /// Arm or extend the batch window
    ScheduleBatch,
    /// Enqueue a build right away
    BuildNow,
    /// Leave it for an explicit request or the timer
    Ignore,
}

impl MinerMode {
    /// Reaction of this mode to a pool submission.
    pub fn on_pool_submission(self) -> PoolReaction {
        match self {
            MinerMode::Batch => PoolReaction::ScheduleBatch,
            MinerMode::Instant => PoolReaction::BuildNow,
            MinerMode::Manual | MinerMode::Period => PoolReaction::Ignore,
        }
    }

    /// Whether the scheduler keeps draining the queue after a build.
    ///
    /// Period mode services one request per tick or explicit request.
    pub fn drains_continuously(self) -> bool {
        !matches!(self, MinerMode::Period)
    }
}
