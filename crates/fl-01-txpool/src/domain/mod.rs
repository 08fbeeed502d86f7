//! # Domain Layer - Pool Subsystem
//!
//! Pure pool state with no I/O.
//!
//! ## Components
//!
//! - `buffers`: the four pending-work buffers and snapshot semantics
//! - `value_objects`: PoolEntry, BuildOverrides, PoolStatus
//! - `errors`: TxPoolError enumeration

pub mod buffers;
pub mod errors;
pub mod value_objects;

pub use buffers::*;
pub use errors::*;
pub use value_objects::*;
