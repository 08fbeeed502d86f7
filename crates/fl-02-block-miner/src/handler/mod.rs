//! Event handlers
//!
//! - Pool submissions: drive Batch and Instant mode builds

pub(crate) mod pool_events;
