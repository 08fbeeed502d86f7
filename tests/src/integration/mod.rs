//! Cross-subsystem flows.
//!
//! - `flows`: submissions reaching committed blocks in every mode
//! - `choreography`: the miner driven through the bus alone

pub mod choreography;
pub mod flows;
