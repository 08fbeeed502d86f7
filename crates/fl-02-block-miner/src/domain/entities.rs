//! Queued build requests.

use super::completion::{completion_pair, BlockCompletion, BlockTicket};
use shared_types::entities::BuildBlockParams;
use uuid::Uuid;

/// A build request waiting in the scheduler queue.
///
/// `params` were snapshotted from the pool when the request was queued.
#[derive(Debug)]
pub struct PendingBlock {
    /// Request id, for logs
    pub id: Uuid,
    /// Block contents
    pub params: BuildBlockParams,
    /// Resolving side
    pub completion: BlockCompletion,
    /// Handed back to the requester
    pub ticket: BlockTicket,
}

impl PendingBlock {
    /// Create a request for `params`.
    pub fn new(params: BuildBlockParams) -> Self {
        let (completion, ticket) = completion_pair();
        Self {
            id: Uuid::new_v4(),
            params,
            completion,
            ticket,
        }
    }
}
