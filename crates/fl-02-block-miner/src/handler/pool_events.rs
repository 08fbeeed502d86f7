//! Handlers for pool submission events from the TxPool (fl-01)
//!
//! Two reactions hang off the bus:
//!
//! - [`on_submission`] runs inline on the submitter's task and serves
//!   Instant mode, one snapshot per notification.
//! - [`run`] is one task per miner and owns the batch debounce state, so
//!   the window only ever moves on this task.

use crate::config::MinerMode;
use crate::domain::{BatchTrigger, PoolReaction};
use crate::service::MinerInner;
use shared_bus::{ChainEvent, Subscription};
use std::future::pending;
use std::sync::{Arc, Weak};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// Listen for submissions until the miner is dropped or the bus closes.
pub(crate) async fn run(miner: Weak<MinerInner>, mut subscription: Subscription) {
    let mut batch = BatchTrigger::default();

    loop {
        let deadline = batch.deadline();
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    debug!("[fl-02] Bus closed, pool listener exiting");
                    break;
                };
                let Some(inner) = miner.upgrade() else { break };
                on_event(&inner, &mut batch, &event);
            }
            _ = sleep_until_opt(deadline) => {
                if !batch.take_due(Instant::now()) {
                    continue;
                }
                let Some(inner) = miner.upgrade() else { break };
                if inner.mode() == MinerMode::Batch {
                    inner.request_auto_build("batch");
                } else {
                    debug!("[fl-02] Batch window elapsed after mode change, skipping");
                }
            }
        }
    }
}

/// Inline reaction to a pool notification, before the publisher resumes.
pub(crate) fn on_submission(inner: &Arc<MinerInner>, event: &ChainEvent) {
    if !event.is_submission() {
        return;
    }
    if inner.mode().on_pool_submission() == PoolReaction::BuildNow {
        inner.request_auto_build("instant");
    }
}

fn on_event(inner: &Arc<MinerInner>, batch: &mut BatchTrigger, event: &ChainEvent) {
    if !event.is_submission() {
        return;
    }

    match inner.mode().on_pool_submission() {
        PoolReaction::ScheduleBatch => {
            let deadline = batch.schedule(Instant::now());
            trace!(
                in_ms = deadline.saturating_duration_since(Instant::now()).as_millis() as u64,
                "[fl-02] Batch window extended"
            );
        }
        // served by `on_submission`
        PoolReaction::BuildNow | PoolReaction::Ignore => {}
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
