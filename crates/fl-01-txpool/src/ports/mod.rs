//! Ports layer for the pool subsystem.
//!
//! - Inbound (Driving) port: `TxPoolApi`
//! - Outbound (Driven) port: `SignerResolver`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
