//! Periodic build trigger.
//!
//! Two states: stopped (no task) and running (one interval task). Ticks are
//! independent; a late tick is delayed, never followed by a catch-up burst.

use crate::config::{MinerConfig, MinerMode};
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Fires a callback on a fixed interval while running.
///
/// The first tick fires one full period after `start`. The callback
/// returns `ControlFlow::Break` to end the task on its own.
#[derive(Debug, Default)]
pub struct PeriodicTrigger {
    handle: Option<JoinHandle<()>>,
    interval: Option<Duration>,
}

impl PeriodicTrigger {
    /// A stopped trigger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `period`, replacing any running timer.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.stop();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        });

        debug!(period_ms = period.as_millis() as u64, "[fl-02] Periodic trigger started");
        self.handle = Some(handle);
        self.interval = Some(period);
    }

    /// Stop ticking. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("[fl-02] Periodic trigger stopped");
        }
        self.interval = None;
    }

    /// Stop, then start again iff `config` selects Period mode.
    ///
    /// An invalid interval falls back to the default period.
    pub fn reset<F>(&mut self, config: &MinerConfig, on_tick: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.stop();
        if config.mode == MinerMode::Period {
            self.start(config.build_interval(), on_tick);
        }
    }

    /// Active period, if running.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Whether the timer task is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PeriodicTrigger {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
