//! Outbound ports (driven side - SPI)

use crate::error::Result;
use async_trait::async_trait;
use shared_types::entities::{Block, BuildBlockParams, Extrinsic, HexBytes, UpwardMessages};

/// Port: the chain the miner extends
#[async_trait]
pub trait ChainConnection: Send + Sync {
    /// Resolve once the chain can accept blocks.
    async fn ready(&self) -> Result<()>;

    /// Current head block.
    async fn head(&self) -> Result<Block>;

    /// Commit `block` as the new head.
    async fn set_head(&self, block: Block) -> Result<()>;
}

/// Port: derive the inherent extrinsics for the next block
#[async_trait]
pub trait InherentProvider: Send + Sync {
    /// Inherents for the child of `parent`, given the block contents.
    ///
    /// Message params are consumed here; the builder only sees
    /// transactions and upward messages.
    async fn create_inherents(
        &self,
        parent: &Block,
        params: &BuildBlockParams,
    ) -> Result<Vec<HexBytes>>;
}

/// Callback for extrinsics that fail to apply: `(extrinsic, reason)`.
pub type ApplyErrorCallback<'a> = &'a (dyn Fn(&Extrinsic, &str) + Send + Sync);

/// Result of a block build
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOutput {
    /// The new block
    pub block: Block,

    /// Extrinsics that did not make it into the block and should go back
    /// into the pool
    pub pending_extrinsics: Vec<Extrinsic>,
}

/// Port: execute a block on top of the head
#[async_trait]
pub trait BlockBuilder: Send + Sync {
    /// Build a child of `parent`.
    ///
    /// Individual extrinsic failures go to `on_apply_error` and do not fail
    /// the build. An `Err` means the block as a whole could not be built.
    async fn build_block(
        &self,
        parent: &Block,
        inherents: Vec<HexBytes>,
        extrinsics: Vec<Extrinsic>,
        upward_messages: UpwardMessages,
        on_apply_error: ApplyErrorCallback<'_>,
    ) -> Result<BuildOutput>;
}
