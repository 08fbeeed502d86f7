//! Domain layer for the block miner.

pub mod batch;
pub mod completion;
pub mod entities;
pub mod policy;

pub use batch::BatchTrigger;
pub use completion::{completion_pair, BlockCompletion, BlockTicket, BuildOutcome};
pub use entities::PendingBlock;
pub use policy::PoolReaction;
