//! # Block Miner Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Turns pool submissions, timer ticks and explicit requests into block
//! builds that run strictly one at a time, in request order.
//!
//! ## Modes
//!
//! | Code | Mode | Pool submission | Timer | After a build |
//! |------|------|-----------------|-------|---------------|
//! | 0 | `Batch` | extend 100 ms window (cap 1000 ms) | off | drain backlog |
//! | 1 | `Instant` | build now | off | drain backlog |
//! | 2 | `Manual` | nothing | off | drain backlog |
//! | 3 | `Period` | nothing | every `interval` s | stop, one per stimulus |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | At most one build in flight | `service.rs` - `building` flag + drop guard |
//! | FIFO completion | `service.rs` - head serviced, popped, then resolved |
//! | Snapshot order equals queue order | `service.rs` - snapshot taken under miner lock |
//! | Batch build within 1000 ms of first submission | `domain/batch.rs` - capped deadline |
//! | No stale tick after a mode switch | `adapters/periodic.rs` - abort on reset |
//!
//! ## Servicing a Request
//!
//! ```text
//! queue head ──→ chain.ready ──→ chain.head ──→ inherents ──→ builder
//!                                                               │
//!        ticket resolved ←── pop ←── set_head ←── resubmit ←────┘
//!                                                 (failed extrinsics)
//! ```
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `ChainConnection` | Readiness, head, commit |
//! | `InherentProvider` | Inherents for the next block |
//! | `BlockBuilder` | Execute the block |
//! | `fl_01_txpool::TxPoolApi` | Snapshots and resubmission |
//!
//! ## Module Structure
//!
//! - [`domain`]: batch window, completion tickets, mode policy
//! - [`ports`]: `BlockMinerApi` and the collaborator traits
//! - [`adapters`]: periodic trigger
//! - `handler`: inline Instant reaction and the batch listener task
//! - [`service`]: `BlockMiner`

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Timer adapters
pub mod adapters;
/// Domain models and scheduling logic
pub mod domain;
mod handler;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod config;
mod error;
mod metrics;

pub use config::{
    MinerConfig, MinerMode, ARG_PREFIX, BATCH_MAX_WAIT, BATCH_WINDOW, DEFAULT_BUILD_PERIOD,
    INTERVAL_ARG,
};
pub use error::{MinerError, Result};
pub use metrics::Metrics;

pub use domain::{BatchTrigger, BlockTicket, BuildOutcome, PendingBlock, PoolReaction};
pub use ports::{
    ApplyErrorCallback, BlockBuilder, BlockMinerApi, BuildOutput, ChainConnection,
    InherentProvider,
};
pub use service::{BlockMiner, MinerDependencies};

/// Subsystem identifier for bus events
pub const SUBSYSTEM_ID: u8 = shared_bus::BLOCK_MINER_SUBSYSTEM_ID;
