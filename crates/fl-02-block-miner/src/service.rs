//! # Block Miner Service
//!
//! Owns the request queue and the `building` flag. Every trigger (batch
//! window, instant submission, timer tick, explicit request) goes through
//! the queue; servicing always takes the head.
//!
//! Instant mode reacts inline, through a bus handler running on the
//! submitter's task, so each awaited submission gets its own snapshot.

use crate::adapters::PeriodicTrigger;
use crate::config::{MinerConfig, MinerMode};
use crate::domain::{BlockTicket, PendingBlock};
use crate::error::{MinerError, Result};
use crate::handler::pool_events;
use crate::metrics::Metrics;
use crate::ports::{BlockBuilder, BlockMinerApi, BuildOutput, ChainConnection, InherentProvider};
use crate::SUBSYSTEM_ID;
use async_trait::async_trait;
use fl_01_txpool::{BuildOverrides, TxPoolApi};
use forklab_telemetry::{log_block_event, log_event, subsystem_span};
use parking_lot::Mutex;
use shared_bus::{ChainEvent, EventFilter, EventTopic, HandlerId, InMemoryEventBus};
use shared_types::entities::{Block, BuildBlockParams, Extrinsic};
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn, Instrument};
use uuid::Uuid;

/// Collaborators the miner drives.
#[derive(Clone)]
pub struct MinerDependencies {
    /// Chain whose head the miner extends
    pub chain: Arc<dyn ChainConnection>,
    /// Inherent derivation
    pub inherents: Arc<dyn InherentProvider>,
    /// Block execution
    pub builder: Arc<dyn BlockBuilder>,
    /// Pending work pool
    pub txpool: Arc<dyn TxPoolApi>,
    /// Shared bus carrying pool submissions and miner events
    pub bus: Arc<InMemoryEventBus>,
}

struct MinerState {
    config: MinerConfig,
    pending: VecDeque<PendingBlock>,
    building: bool,
}

/// Shared miner state. Background tasks hold it weakly.
pub(crate) struct MinerInner {
    deps: MinerDependencies,
    state: Mutex<MinerState>,
    trigger: Mutex<PeriodicTrigger>,
    metrics: Metrics,
    runtime: Handle,
    listener: Mutex<Option<JoinHandle<()>>>,
    inline_handler: Mutex<Option<HandlerId>>,
}

/// Clears `building` on every exit from a servicing step, unwinding included.
struct BuildingGuard<'a>(&'a Mutex<MinerState>);

impl Drop for BuildingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().building = false;
    }
}

impl MinerInner {
    pub(crate) fn mode(&self) -> MinerMode {
        self.state.lock().config.mode
    }

    /// Snapshot the pool and queue a build, unless the pool is empty.
    pub(crate) fn request_auto_build(self: &Arc<Self>, trigger: &'static str) {
        {
            let mut state = self.state.lock();
            if self.deps.txpool.status().is_empty() {
                trace!(trigger, "[fl-02] Pool empty, no block needed");
                return;
            }
            let params = self.deps.txpool.create_new_block(BuildOverrides::none());
            self.enqueue(&mut state, params, trigger);
        }
        self.build_if_needed();
    }

    fn request_build(self: &Arc<Self>, overrides: BuildOverrides) -> BlockTicket {
        let ticket = {
            let mut state = self.state.lock();
            // snapshot under the miner lock so snapshot order equals queue order
            let params = self.deps.txpool.create_new_block(overrides);
            self.enqueue(&mut state, params, "request")
        };
        self.build_if_needed();
        ticket
    }

    fn request_build_with_params(self: &Arc<Self>, params: BuildBlockParams) -> BlockTicket {
        let ticket = {
            let mut state = self.state.lock();
            self.enqueue(&mut state, params, "explicit")
        };
        self.build_if_needed();
        ticket
    }

    fn enqueue(
        &self,
        state: &mut MinerState,
        params: BuildBlockParams,
        trigger: &'static str,
    ) -> BlockTicket {
        let request = PendingBlock::new(params);
        let ticket = request.ticket.clone();
        debug!(
            request = %request.id,
            trigger,
            transactions = request.params.transactions.len(),
            messages = request.params.message_count(),
            queued = state.pending.len() + 1,
            "[fl-02] Build request queued"
        );
        state.pending.push_back(request);
        self.metrics.record_request();
        ticket
    }

    /// Start servicing the queue head unless a build is in flight.
    fn build_if_needed(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if state.building || state.pending.is_empty() {
                return;
            }
            state.building = true;
        }
        let inner = self.clone();
        self.runtime.spawn(inner.drain_step());
    }

    async fn drain_step(self: Arc<Self>) {
        let guard = BuildingGuard(&self.state);
        let result = self
            .service_head()
            .instrument(subsystem_span!("service_block", subsystem = "fl-02"))
            .await;
        drop(guard);

        if let Err(e) = &result {
            if e.is_critical() {
                error!(error = %e, "[fl-02] Scheduler fault, draining halted");
                self.deps.bus.emit(ChainEvent::CriticalError {
                    subsystem_id: SUBSYSTEM_ID,
                    error: e.to_string(),
                });
                return;
            }
        }

        if self.mode().drains_continuously() {
            self.build_if_needed();
        }
    }

    /// Service exactly the head of the queue and resolve its ticket.
    async fn service_head(&self) -> Result<Block> {
        let started = Instant::now();
        let (id, params) = {
            let mut state = self.state.lock();
            let Some(head) = state.pending.front_mut() else {
                return Err(MinerError::InconsistentState {
                    reason: "build queue empty while servicing".into(),
                });
            };
            // the head keeps its params until popped, so a retry after an
            // unwinding build sees the same work
            (head.id, head.params.clone())
        };

        let result = self.build_on_head(id, params).await;

        let Some(request) = self.state.lock().pending.pop_front() else {
            return Err(MinerError::InconsistentState {
                reason: format!("request {id} left the queue while in flight"),
            });
        };

        let outcome = match result {
            Ok((block, applied)) => {
                self.metrics.record_block_built(applied, started.elapsed());
                self.deps.bus.emit(ChainEvent::BlockBuilt {
                    number: block.number,
                    hash: block.hash,
                    extrinsic_count: block.extrinsics.len(),
                });
                log_block_event!(
                    info,
                    "fl-02",
                    "[fl-02] Block built",
                    block.number,
                    block.hash,
                    request = %id,
                    applied
                );
                Ok(block)
            }
            Err(e) => {
                self.metrics.record_build_failure();
                warn!(request = %id, error = %e, "[fl-02] Block build failed");
                Err(e)
            }
        };

        request.completion.fulfill(outcome.clone());
        outcome
    }

    /// Returns the committed block and the number of applied transactions.
    async fn build_on_head(&self, id: Uuid, params: BuildBlockParams) -> Result<(Block, usize)> {
        self.deps.chain.ready().await?;
        let head = self.deps.chain.head().await?;
        let inherents = self.deps.inherents.create_inherents(&head, &params).await?;
        let inherent_count = inherents.len();

        debug!(
            request = %id,
            parent = head.number,
            transactions = params.transactions.len(),
            inherents = inherent_count,
            "[fl-02] Building block"
        );

        let on_apply_error = |extrinsic: &Extrinsic, reason: &str| {
            warn!(request = %id, error = reason, "[fl-02] Extrinsic failed to apply {:?}", extrinsic);
            self.metrics.record_apply_error();
            self.deps.bus.emit(ChainEvent::ApplyExtrinsicError {
                extrinsic: extrinsic.clone(),
                error: reason.to_string(),
            });
        };

        let BuildOutput {
            block,
            pending_extrinsics,
        } = self
            .deps
            .builder
            .build_block(
                &head,
                inherents,
                params.transactions,
                params.upward_messages,
                &on_apply_error,
            )
            .await?;

        for extrinsic in pending_extrinsics {
            match self.deps.txpool.submit_extrinsic(extrinsic).await {
                Ok(_) => self.metrics.record_resubmitted(),
                Err(e) => warn!(request = %id, error = %e, "[fl-02] Could not resubmit extrinsic"),
            }
        }

        self.deps.chain.set_head(block.clone()).await?;
        let applied = block.extrinsics.len().saturating_sub(inherent_count);
        Ok((block, applied))
    }

    fn reset_miner(self: &Arc<Self>) {
        let config = self.state.lock().config.clone();
        let weak = Arc::downgrade(self);
        self.trigger.lock().reset(&config, move || match weak.upgrade() {
            Some(inner) => {
                inner.request_build(BuildOverrides::none());
                ControlFlow::Continue(())
            }
            None => ControlFlow::Break(()),
        });
    }
}

impl Drop for MinerInner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
        if let Some(id) = self.inline_handler.get_mut().take() {
            self.deps.bus.off(id);
        }
    }
}

/// The block miner.
///
/// Cheap to clone; clones share one queue. Background tasks stop once the
/// last clone is dropped.
#[derive(Clone)]
pub struct BlockMiner {
    inner: Arc<MinerInner>,
}

impl BlockMiner {
    /// Create a miner and start listening for pool submissions.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(deps: MinerDependencies, config: MinerConfig) -> Self {
        info!(
            mode = ?config.mode,
            interval_ms = config.build_interval().as_millis() as u64,
            "[fl-02] Initializing block miner"
        );

        // subscribe before spawning so no submission after `new` is missed
        let subscription = deps
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::TxPool]));
        let runtime = Handle::current();

        let inner = Arc::new(MinerInner {
            deps,
            state: Mutex::new(MinerState {
                config,
                pending: VecDeque::new(),
                building: false,
            }),
            trigger: Mutex::new(PeriodicTrigger::new()),
            metrics: Metrics::new(),
            runtime,
            listener: Mutex::new(None),
            inline_handler: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        let handler = inner.deps.bus.on(
            EventFilter::topics(vec![EventTopic::TxPool]),
            move |event| {
                if let Some(inner) = weak.upgrade() {
                    pool_events::on_submission(&inner, event);
                }
            },
        );
        *inner.inline_handler.lock() = Some(handler);

        let listener = inner
            .runtime
            .spawn(pool_events::run(Arc::downgrade(&inner), subscription));
        *inner.listener.lock() = Some(listener);
        inner.reset_miner();

        Self { inner }
    }

    /// Re-apply the current config to the periodic trigger.
    pub fn reset_miner(&self) {
        self.inner.reset_miner();
    }

    /// Whether a servicing step is in flight.
    pub fn is_building(&self) -> bool {
        self.inner.state.lock().building
    }

    /// Active timer period, if the trigger is running.
    pub fn timer_interval(&self) -> Option<std::time::Duration> {
        self.inner.trigger.lock().interval()
    }

    /// Miner metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// The pool this miner snapshots.
    pub fn txpool(&self) -> &Arc<dyn TxPoolApi> {
        &self.inner.deps.txpool
    }

    /// The shared bus.
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.inner.deps.bus
    }

    #[cfg(test)]
    fn downgrade(&self) -> std::sync::Weak<MinerInner> {
        Arc::downgrade(&self.inner)
    }
}

#[async_trait]
impl BlockMinerApi for BlockMiner {
    fn set_config(&self, config: MinerConfig) {
        log_event!(info, "fl-02", "[fl-02] Miner config updated", mode = ?config.mode);
        self.inner.state.lock().config = config;
        self.inner.reset_miner();
    }

    fn config(&self) -> MinerConfig {
        self.inner.state.lock().config.clone()
    }

    fn request_build(&self, overrides: BuildOverrides) -> BlockTicket {
        self.inner.request_build(overrides)
    }

    fn request_build_with_params(&self, params: BuildBlockParams) -> BlockTicket {
        self.inner.request_build_with_params(params)
    }

    async fn build_block(&self, overrides: BuildOverrides) -> Result<Block> {
        self.request_build(overrides).wait().await
    }

    async fn upcoming_blocks(&self) -> usize {
        let (count, last) = {
            let state = self.inner.state.lock();
            (
                state.pending.len(),
                state.pending.back().map(|r| r.ticket.clone()),
            )
        };
        if let Some(ticket) = last {
            // outcome already logged by the servicing step
            let _ = ticket.wait().await;
        }
        count
    }

    fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }
}
