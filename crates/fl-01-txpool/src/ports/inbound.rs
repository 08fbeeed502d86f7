//! # Inbound Port - TxPoolApi
//!
//! Primary driving port exposing the pending work pool.
//!
//! | Method | Typical caller |
//! |--------|----------------|
//! | `submit_extrinsic` | RPC layer, block miner (resubmission) |
//! | `submit_*_messages` | RPC layer, cross-chain test harness |
//! | `create_new_block` | Block miner |
//! | `clear` | Chain reset |

use crate::domain::{BuildOverrides, PoolEntry, PoolStatus, TxPoolError};
use async_trait::async_trait;
use shared_types::entities::{
    BuildBlockParams, DownwardMessage, Extrinsic, HexBytes, HorizontalMessage,
    HorizontalMessages, ParaId, UpwardMessages,
};

/// Primary API for the pool subsystem.
///
/// Submissions append and then publish a notification on the shared bus.
/// The snapshot is synchronous so it can be taken under a caller's lock.
///
/// # Example
///
/// ```rust,ignore
/// use fl_01_txpool::{BuildOverrides, TxPoolApi};
///
/// async fn example(pool: &impl TxPoolApi, xt: Extrinsic) {
///     let signer = pool.submit_extrinsic(xt).await?;
///     let params = pool.create_new_block(BuildOverrides::none());
///     assert_eq!(params.transactions.len(), 1);
/// }
/// ```
#[async_trait]
pub trait TxPoolApi: Send + Sync {
    /// Resolves the signer, appends the extrinsic and publishes
    /// `TransactionSubmitted`. Returns the resolved signer.
    ///
    /// Concurrent submissions land in the order their signer resolution
    /// completes. Await each call when strict ordering matters.
    ///
    /// # Errors
    /// - `Decode`: the payload could not be decoded; nothing was appended
    async fn submit_extrinsic(&self, extrinsic: Extrinsic) -> Result<String, TxPoolError>;

    /// Appends upward messages from `para_id`.
    async fn submit_upward_messages(&self, para_id: ParaId, messages: Vec<HexBytes>);

    /// Appends downward messages.
    async fn submit_downward_messages(&self, messages: Vec<DownwardMessage>);

    /// Appends horizontal messages from `para_id`.
    async fn submit_horizontal_messages(&self, para_id: ParaId, messages: Vec<HorizontalMessage>);

    /// Atomically forms the params for the next block.
    ///
    /// Overridden fields are used verbatim and their buffers left alone.
    /// Other buffers are drained. No submission can be split across two
    /// snapshots or appear in both.
    fn create_new_block(&self, overrides: BuildOverrides) -> BuildBlockParams;

    /// Drops all pending work.
    fn clear(&self);

    /// Pending extrinsics in acceptance order.
    fn pending_extrinsics(&self) -> Vec<PoolEntry>;

    /// Pending extrinsics from one signer.
    fn pending_extrinsics_by(&self, signer: &str) -> Vec<Extrinsic>;

    /// Queued upward messages.
    fn ump(&self) -> UpwardMessages;

    /// Queued downward messages.
    fn dmp(&self) -> Vec<DownwardMessage>;

    /// Queued horizontal messages.
    fn hrmp(&self) -> HorizontalMessages;

    /// Buffer counts.
    fn status(&self) -> PoolStatus;
}
