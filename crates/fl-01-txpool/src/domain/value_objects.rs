//! Value objects for the pool subsystem.

use serde::{Deserialize, Serialize};
use shared_types::entities::{
    BuildBlockParams, DownwardMessage, Extrinsic, HorizontalMessages, UpwardMessages,
};

/// A pooled extrinsic together with the signer it was resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// The submitted extrinsic.
    pub extrinsic: Extrinsic,
    /// Signer identity resolved at submission time.
    pub signer: String,
}

/// Per-field replacements for a build snapshot.
///
/// A field set to `Some` is used verbatim and the matching pool buffer is
/// left untouched. A field left as `None` drains the pool buffer instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildOverrides {
    /// Replaces the pooled extrinsics.
    pub transactions: Option<Vec<Extrinsic>>,
    /// Replaces the queued upward messages.
    pub upward_messages: Option<UpwardMessages>,
    /// Replaces the queued downward messages.
    pub downward_messages: Option<Vec<DownwardMessage>>,
    /// Replaces the queued horizontal messages.
    pub horizontal_messages: Option<HorizontalMessages>,
}

impl BuildOverrides {
    /// No overrides: the snapshot drains every buffer.
    pub fn none() -> Self {
        Self::default()
    }

    /// Override the transaction list.
    pub fn with_transactions(mut self, transactions: Vec<Extrinsic>) -> Self {
        self.transactions = Some(transactions);
        self
    }

    /// Override the upward messages.
    pub fn with_upward_messages(mut self, messages: UpwardMessages) -> Self {
        self.upward_messages = Some(messages);
        self
    }

    /// Override the downward messages.
    pub fn with_downward_messages(mut self, messages: Vec<DownwardMessage>) -> Self {
        self.downward_messages = Some(messages);
        self
    }

    /// Override the horizontal messages.
    pub fn with_horizontal_messages(mut self, messages: HorizontalMessages) -> Self {
        self.horizontal_messages = Some(messages);
        self
    }

    /// True if no field is overridden.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_none()
            && self.upward_messages.is_none()
            && self.downward_messages.is_none()
            && self.horizontal_messages.is_none()
    }
}

impl From<BuildBlockParams> for BuildOverrides {
    /// Overrides every field, bypassing the pool entirely.
    fn from(params: BuildBlockParams) -> Self {
        Self {
            transactions: Some(params.transactions),
            upward_messages: Some(params.upward_messages),
            downward_messages: Some(params.downward_messages),
            horizontal_messages: Some(params.horizontal_messages),
        }
    }
}

/// Counts of what is currently waiting in the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Pending extrinsics.
    pub extrinsics: usize,
    /// Upward messages across all chains.
    pub upward_messages: usize,
    /// Downward messages.
    pub downward_messages: usize,
    /// Horizontal messages across all chains.
    pub horizontal_messages: usize,
}

impl PoolStatus {
    /// True if the next snapshot would carry no work.
    pub fn is_empty(&self) -> bool {
        self.extrinsics == 0
            && self.upward_messages == 0
            && self.downward_messages == 0
            && self.horizontal_messages == 0
    }
}
