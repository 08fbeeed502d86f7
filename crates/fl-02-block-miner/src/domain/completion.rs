//! One-shot block request completion.
//!
//! A request resolves exactly once; every clone of its ticket observes the
//! same outcome, including clones made after resolution.

use crate::error::MinerError;
use shared_types::entities::Block;
use tokio::sync::watch;

/// Result of servicing one build request.
pub type BuildOutcome = Result<Block, MinerError>;

/// Create a linked completion and ticket.
pub fn completion_pair() -> (BlockCompletion, BlockTicket) {
    let (tx, rx) = watch::channel(None);
    (BlockCompletion { tx }, BlockTicket { rx })
}

/// Resolving side, owned by the scheduler.
#[derive(Debug)]
pub struct BlockCompletion {
    tx: watch::Sender<Option<BuildOutcome>>,
}

impl BlockCompletion {
    /// Resolve the request. Consumes the completion.
    pub fn fulfill(self, outcome: BuildOutcome) {
        self.tx.send_replace(Some(outcome));
    }
}

/// Awaitable handle to a queued build request.
#[derive(Debug, Clone)]
pub struct BlockTicket {
    rx: watch::Receiver<Option<BuildOutcome>>,
}

impl BlockTicket {
    /// Wait for the request to resolve.
    ///
    /// Yields `Internal` if the scheduler dropped the request unresolved.
    pub async fn wait(&self) -> BuildOutcome {
        let mut rx = self.rx.clone();
        let result = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };
        result.unwrap_or_else(|| Err(MinerError::Internal("block request abandoned".into())))
    }

    /// Whether the request has resolved.
    pub fn is_complete(&self) -> bool {
        self.rx.borrow().is_some()
    }
}
