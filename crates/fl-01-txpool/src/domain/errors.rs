//! Pool error types.

use thiserror::Error;

/// Pool error type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TxPoolError {
    /// The extrinsic could not be decoded under the current type registry.
    /// Nothing was added to the pool.
    #[error("Failed to decode extrinsic: {0}")]
    Decode(String),

    /// Internal error.
    #[error("Internal pool error: {0}")]
    Internal(String),
}

impl TxPoolError {
    /// True if resubmitting the same payload can never succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
