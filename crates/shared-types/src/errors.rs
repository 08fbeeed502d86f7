//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised while constructing shared types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// Payload is not valid hex.
    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),
}
