//! Adapters for the block miner.

pub mod periodic;

pub use periodic::PeriodicTrigger;
