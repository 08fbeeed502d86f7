//! Inbound ports (driving side - API)

use crate::config::MinerConfig;
use crate::domain::BlockTicket;
use crate::error::Result;
use async_trait::async_trait;
use fl_01_txpool::BuildOverrides;
use shared_types::entities::{Block, BuildBlockParams};

/// Primary API for the block miner.
///
/// Requests are serviced one at a time, in the order they were queued.
///
/// # Example
///
/// ```rust,ignore
/// let ticket = miner.request_build(BuildOverrides::none());
/// let block = ticket.wait().await?;
/// ```
#[async_trait]
pub trait BlockMinerApi: Send + Sync {
    /// Replace the mode and arguments, restarting the periodic timer.
    fn set_config(&self, config: MinerConfig);

    /// Current configuration.
    fn config(&self) -> MinerConfig;

    /// Snapshot the pool (fields in `overrides` used verbatim) and queue a
    /// build. The snapshot and the enqueue happen atomically.
    fn request_build(&self, overrides: BuildOverrides) -> BlockTicket;

    /// Queue a build of exactly `params`; the pool is left untouched.
    fn request_build_with_params(&self, params: BuildBlockParams) -> BlockTicket;

    /// Queue a build and wait for it.
    async fn build_block(&self, overrides: BuildOverrides) -> Result<Block>;

    /// Number of queued or in-flight requests. If non-zero, waits for the
    /// most recently queued one before returning.
    async fn upcoming_blocks(&self) -> usize;

    /// Number of queued requests, in-flight included.
    fn pending_count(&self) -> usize;
}
