//! # Shared Types Crate
//!
//! This crate contains the domain entities exchanged between the transaction
//! pool, the block miner and the shared bus.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Opaque Payloads**: Extrinsics and messages are carried as bytes; their
//!   encoding belongs to the runtime, not to this workspace.
//! - **Ordered Collections**: Every collection preserves submission order.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
