//! In-memory collaborators for driving the miner in tests.

use crate::config::MinerConfig;
use crate::error::{MinerError, Result};
use crate::ports::{
    ApplyErrorCallback, BlockBuilder, BuildOutput, ChainConnection, InherentProvider,
};
use crate::service::{BlockMiner, MinerDependencies};
use async_trait::async_trait;
use fl_01_txpool::{PrefixSignerResolver, TxPool};
use parking_lot::Mutex;
use shared_bus::InMemoryEventBus;
use shared_types::entities::{Block, BuildBlockParams, Extrinsic, HexBytes, UpwardMessages, H256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::time::Instant;

/// Let spawned tasks run without advancing the clock.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Hash the mock chain assigns to block `number`.
pub fn block_hash(number: u64) -> H256 {
    H256::from_low_u64_be(number)
}

/// Chain held in memory, starting at genesis.
pub struct InMemoryChain {
    ready: watch::Sender<bool>,
    head: Mutex<Block>,
    commits: Mutex<Vec<(Block, Instant)>>,
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryChain {
    /// A ready chain at genesis.
    pub fn new() -> Self {
        Self {
            ready: watch::channel(true).0,
            head: Mutex::new(Block::genesis(block_hash(0))),
            commits: Mutex::new(Vec::new()),
        }
    }

    /// Block or release builds waiting on readiness.
    pub fn set_ready(&self, ready: bool) {
        self.ready.send_replace(ready);
    }

    /// Committed blocks, oldest first.
    pub fn commits(&self) -> Vec<Block> {
        self.commits.lock().iter().map(|(b, _)| b.clone()).collect()
    }

    /// When each block was committed.
    pub fn commit_times(&self) -> Vec<Instant> {
        self.commits.lock().iter().map(|(_, t)| *t).collect()
    }

    /// Height of the current head.
    pub fn head_number(&self) -> u64 {
        self.head.lock().number
    }
}

#[async_trait]
impl ChainConnection for InMemoryChain {
    async fn ready(&self) -> Result<()> {
        let mut rx = self.ready.subscribe();
        rx.wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| MinerError::Chain("chain connection closed".into()))
    }

    async fn head(&self) -> Result<Block> {
        Ok(self.head.lock().clone())
    }

    async fn set_head(&self, block: Block) -> Result<()> {
        let mut head = self.head.lock();
        if block.parent_hash != head.hash {
            return Err(MinerError::Chain(format!(
                "block {} does not extend head {}",
                block.number, head.number
            )));
        }
        *head = block.clone();
        self.commits.lock().push((block, Instant::now()));
        Ok(())
    }
}

/// Inherent provider that records its inputs.
///
/// Each block gets a single inherent `inherent:<number>`.
#[derive(Default)]
pub struct RecordingInherentProvider {
    calls: Mutex<Vec<(u64, BuildBlockParams)>>,
    fail_next: Mutex<Option<String>>,
}

impl RecordingInherentProvider {
    /// Create a provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call with `reason`.
    pub fn fail_next(&self, reason: impl Into<String>) {
        *self.fail_next.lock() = Some(reason.into());
    }

    /// Recorded `(parent number, params)` pairs.
    pub fn calls(&self) -> Vec<(u64, BuildBlockParams)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl InherentProvider for RecordingInherentProvider {
    async fn create_inherents(
        &self,
        parent: &Block,
        params: &BuildBlockParams,
    ) -> Result<Vec<HexBytes>> {
        self.calls.lock().push((parent.number, params.clone()));
        if let Some(reason) = self.fail_next.lock().take() {
            return Err(MinerError::Inherent(reason));
        }
        let inherent = format!("inherent:{}", parent.number + 1);
        Ok(vec![HexBytes::new(inherent.into_bytes())])
    }
}

/// Inputs of one `build_block` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildCall {
    /// Parent height
    pub parent: u64,
    /// Inherents passed in
    pub inherents: Vec<HexBytes>,
    /// Transactions passed in
    pub extrinsics: Vec<Extrinsic>,
    /// Upward messages passed in
    pub upward_messages: UpwardMessages,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Block builder with scripted apply failures.
///
/// A failing extrinsic is reported through the apply-error callback and
/// handed back as pending, so it returns to the pool.
#[derive(Default)]
pub struct ScriptedBlockBuilder {
    failures: Mutex<HashMap<Extrinsic, (String, usize)>>,
    fail_next_build: Mutex<Option<String>>,
    panic_next_build: AtomicBool,
    gate: Option<Arc<Semaphore>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<BuildCall>>,
}

impl ScriptedBlockBuilder {
    /// A builder that applies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder where each build consumes one permit of the returned gate.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let builder = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (builder, gate)
    }

    /// Make `extrinsic` fail to apply `times` times with `reason`.
    pub fn fail_times(&self, extrinsic: Extrinsic, reason: impl Into<String>, times: usize) {
        self.failures
            .lock()
            .insert(extrinsic, (reason.into(), times));
    }

    /// Fail the next build as a whole.
    pub fn fail_next_build(&self, reason: impl Into<String>) {
        *self.fail_next_build.lock() = Some(reason.into());
    }

    /// Panic inside the next build, before it is recorded.
    pub fn panic_next_build(&self) {
        self.panic_next_build.store(true, Ordering::SeqCst);
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<BuildCall> {
        self.calls.lock().clone()
    }

    /// Highest number of overlapping builds seen.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn scripted_failure(&self, extrinsic: &Extrinsic) -> Option<String> {
        let mut failures = self.failures.lock();
        let (reason, remaining) = failures.get_mut(extrinsic)?;
        if *remaining == 0 {
            return None;
        }
        *remaining -= 1;
        Some(reason.clone())
    }
}

#[async_trait]
impl BlockBuilder for ScriptedBlockBuilder {
    async fn build_block(
        &self,
        parent: &Block,
        inherents: Vec<HexBytes>,
        extrinsics: Vec<Extrinsic>,
        upward_messages: UpwardMessages,
        on_apply_error: ApplyErrorCallback<'_>,
    ) -> Result<BuildOutput> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| MinerError::Builder("gate closed".into()))?
                .forget();
        }

        if self.panic_next_build.swap(false, Ordering::SeqCst) {
            panic!("scripted builder panic at parent {}", parent.number);
        }

        self.calls.lock().push(BuildCall {
            parent: parent.number,
            inherents: inherents.clone(),
            extrinsics: extrinsics.clone(),
            upward_messages,
        });

        if let Some(reason) = self.fail_next_build.lock().take() {
            return Err(MinerError::Builder(reason));
        }

        let mut applied = inherents;
        let mut pending_extrinsics = Vec::new();
        for extrinsic in extrinsics {
            match self.scripted_failure(&extrinsic) {
                Some(reason) => {
                    on_apply_error(&extrinsic, &reason);
                    pending_extrinsics.push(extrinsic);
                }
                None => applied.push(extrinsic),
            }
        }

        let number = parent.number + 1;
        Ok(BuildOutput {
            block: Block {
                number,
                hash: block_hash(number),
                parent_hash: parent.hash,
                extrinsics: applied,
            },
            pending_extrinsics,
        })
    }
}

/// A miner wired to in-memory collaborators.
pub struct TestNode {
    /// Shared bus
    pub bus: Arc<InMemoryEventBus>,
    /// Pool with one-byte signer prefixes
    pub txpool: Arc<TxPool>,
    /// In-memory chain
    pub chain: Arc<InMemoryChain>,
    /// Recording inherent provider
    pub inherents: Arc<RecordingInherentProvider>,
    /// Scripted builder
    pub builder: Arc<ScriptedBlockBuilder>,
    /// The miner under test
    pub miner: BlockMiner,
}

impl TestNode {
    /// Start a node with an ungated builder.
    pub fn start(config: MinerConfig) -> Self {
        Self::start_with_builder(config, ScriptedBlockBuilder::new())
    }

    /// Start a node around `builder`.
    pub fn start_with_builder(config: MinerConfig, builder: ScriptedBlockBuilder) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let txpool = Arc::new(TxPool::new(
            Arc::new(PrefixSignerResolver::new()),
            bus.clone(),
        ));
        let chain = Arc::new(InMemoryChain::new());
        let inherents = Arc::new(RecordingInherentProvider::new());
        let builder = Arc::new(builder);

        let miner = BlockMiner::new(
            MinerDependencies {
                chain: chain.clone(),
                inherents: inherents.clone(),
                builder: builder.clone(),
                txpool: txpool.clone(),
                bus: bus.clone(),
            },
            config,
        );

        Self {
            bus,
            txpool,
            chain,
            inherents,
            builder,
            miner,
        }
    }
}
