//! Error types for the block miner subsystem

use fl_01_txpool::TxPoolError;
use thiserror::Error;

/// Result type alias for block miner operations
pub type Result<T> = std::result::Result<T, MinerError>;

/// Errors that can occur while scheduling or building blocks
///
/// `Clone` because one outcome is delivered to every holder of a ticket.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MinerError {
    /// Chain connection failed (readiness, head lookup or commit)
    #[error("Chain error: {0}")]
    Chain(String),

    /// Inherent derivation failed
    #[error("Inherent provider error: {0}")]
    Inherent(String),

    /// The block builder failed as a whole
    #[error("Block builder error: {0}")]
    Builder(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scheduler reached a state its drain policy rules out
    #[error("Inconsistent state: {reason}")]
    InconsistentState {
        /// Reason for inconsistency
        reason: String,
    },

    /// The pool rejected a resubmitted extrinsic
    #[error("Pool error: {0}")]
    Pool(#[from] TxPoolError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MinerError {
    /// Check if error is recoverable (the next build may succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Chain(_) | Self::Inherent(_) | Self::Builder(_) | Self::Pool(_)
        )
    }

    /// Check if error is critical (indicates a scheduler bug)
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::InconsistentState { .. } | Self::Internal(_))
    }
}
