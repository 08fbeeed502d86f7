//! # Pending Work Pool Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Accumulates extrinsics and cross-chain messages until the block miner
//! takes a snapshot of them for the next block.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | FIFO order within every buffer | `domain/buffers.rs` - append-only pushes |
//! | Each entry reaches exactly one snapshot | `domain/buffers.rs` - `take_for_build()` drains |
//! | Snapshot is atomic w.r.t. submissions | `service.rs` - single lock, no await while held |
//! | Undecodable extrinsics never enter the pool | `service.rs` - signer resolved before append |
//!
//! ## Snapshot Semantics
//!
//! ```text
//! submit_* ──append──→ [pool | ump | dmp | hrmp] ──create_new_block──→ BuildBlockParams
//!                                                     │
//!                                                     └── overridden field: used verbatim,
//!                                                         buffer left untouched
//! ```
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `SignerResolver` | Decode an extrinsic's signer |
//! | `shared_bus::EventPublisher` | Announce submissions to the block miner |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service.rs        - TxPool (ports wired to domain)             │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - TxPoolApi trait                            │
//! │  ports/outbound.rs - SignerResolver trait                       │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/buffers.rs       - PoolBuffers                          │
//! │  domain/value_objects.rs - PoolEntry, BuildOverrides, PoolStatus│
//! │  domain/errors.rs        - TxPoolError                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::TxPool;

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = shared_bus::TXPOOL_SUBSYSTEM_ID;
