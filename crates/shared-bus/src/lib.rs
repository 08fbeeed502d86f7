//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! The transaction pool and the block miner never call each other to announce
//! work. The pool publishes submission events here; the miner subscribes and
//! applies its mode policy. The miner in turn publishes apply errors and built
//! blocks for callers and tests to observe.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   TxPool     │                    │  BlockMiner  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Subscriptions only see events published after they were created.
//! Handlers registered with `InMemoryEventBus::on` run inline on the
//! publishing task, so they observe the pool right after the append that
//! produced the event.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{
    ChainEvent, EventFilter, EventTopic, BLOCK_MINER_SUBSYSTEM_ID, TXPOOL_SUBSYSTEM_ID,
};
pub use publisher::{EventHandler, EventPublisher, HandlerId, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Current protocol version for event bus messages.
pub const PROTOCOL_VERSION: u16 = 1;

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
