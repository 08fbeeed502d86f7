//! # Chain Events
//!
//! Defines all event types that flow through the shared bus.
//!
//! Pool submissions are published here so the block miner can react to them
//! without holding a reference to the pool, and the miner publishes what it
//! built and which extrinsics failed to apply.

use serde::{Deserialize, Serialize};
use shared_types::entities::{DownwardMessage, Extrinsic, HexBytes, HorizontalMessage, ParaId, H256};

/// Subsystem ID of the transaction pool.
pub const TXPOOL_SUBSYSTEM_ID: u8 = 1;

/// Subsystem ID of the block miner.
pub const BLOCK_MINER_SUBSYSTEM_ID: u8 = 2;

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEvent {
    // =========================================================================
    // SUBSYSTEM 1: TRANSACTION POOL
    // =========================================================================
    /// An extrinsic was accepted into the pool.
    TransactionSubmitted {
        /// The accepted extrinsic.
        extrinsic: Extrinsic,
        /// Resolved signer identity.
        signer: String,
    },

    /// Upward messages were queued for a chain.
    UpwardMessagesSubmitted {
        /// Origin chain.
        para_id: ParaId,
        /// Messages, in submission order.
        messages: Vec<HexBytes>,
    },

    /// Downward messages were queued.
    DownwardMessagesSubmitted {
        /// Messages, in submission order.
        messages: Vec<DownwardMessage>,
    },

    /// Horizontal messages were queued for a chain.
    HorizontalMessagesSubmitted {
        /// Origin chain.
        para_id: ParaId,
        /// Messages, in submission order.
        messages: Vec<HorizontalMessage>,
    },

    // =========================================================================
    // SUBSYSTEM 2: BLOCK MINER
    // =========================================================================
    /// An extrinsic failed to apply while a block was being built.
    /// The build itself continues.
    ApplyExtrinsicError {
        /// The failing extrinsic.
        extrinsic: Extrinsic,
        /// Error reported by the builder.
        error: String,
    },

    /// A block was built and committed as the new head.
    BlockBuilt {
        /// Height of the new head.
        number: u64,
        /// Hash of the new head.
        hash: H256,
        /// Number of extrinsics in the block, inherents included.
        extrinsic_count: usize,
    },

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError {
        /// The subsystem that encountered the error.
        subsystem_id: u8,
        /// Error description.
        error: String,
    },
}

impl ChainEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TransactionSubmitted { .. }
            | Self::UpwardMessagesSubmitted { .. }
            | Self::DownwardMessagesSubmitted { .. }
            | Self::HorizontalMessagesSubmitted { .. } => EventTopic::TxPool,
            Self::ApplyExtrinsicError { .. } | Self::BlockBuilt { .. } => EventTopic::BlockMiner,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::TransactionSubmitted { .. }
            | Self::UpwardMessagesSubmitted { .. }
            | Self::DownwardMessagesSubmitted { .. }
            | Self::HorizontalMessagesSubmitted { .. } => TXPOOL_SUBSYSTEM_ID,
            Self::ApplyExtrinsicError { .. } | Self::BlockBuilt { .. } => BLOCK_MINER_SUBSYSTEM_ID,
            Self::CriticalError { subsystem_id, .. } => *subsystem_id,
        }
    }

    /// True for events announcing new pending work in the pool.
    #[must_use]
    pub fn is_submission(&self) -> bool {
        self.topic() == EventTopic::TxPool
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 1 events (submissions).
    TxPool,
    /// Subsystem 2 events (apply errors, built blocks).
    BlockMiner,
    /// Dead Letter Queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ChainEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
