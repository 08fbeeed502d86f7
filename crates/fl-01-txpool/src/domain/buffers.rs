//! # Pool Buffers
//!
//! The four pending-work buffers and their snapshot semantics.
//!
//! ## Buffers
//!
//! - `pool`: extrinsics with their signers, in acceptance order
//! - `ump`: upward messages per origin chain
//! - `dmp`: downward messages
//! - `hrmp`: horizontal messages per origin chain
//!
//! Every buffer only ever grows at the back. `take_for_build` either drains a
//! buffer completely or, when the caller overrides that field, leaves it
//! untouched.

use super::value_objects::{BuildOverrides, PoolEntry, PoolStatus};
use shared_types::entities::{
    BuildBlockParams, DownwardMessage, Extrinsic, HexBytes, HorizontalMessage,
    HorizontalMessages, ParaId, UpwardMessages,
};

/// Pending work waiting for the next block.
#[derive(Debug, Default, Clone)]
pub struct PoolBuffers {
    pool: Vec<PoolEntry>,
    ump: UpwardMessages,
    dmp: Vec<DownwardMessage>,
    hrmp: HorizontalMessages,
}

impl PoolBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extrinsic.
    pub fn push_extrinsic(&mut self, extrinsic: Extrinsic, signer: String) {
        self.pool.push(PoolEntry { extrinsic, signer });
    }

    /// Appends upward messages for a chain, creating its queue on first use.
    pub fn push_upward(&mut self, para_id: ParaId, messages: Vec<HexBytes>) {
        self.ump.entry(para_id).or_default().extend(messages);
    }

    /// Appends downward messages.
    pub fn push_downward(&mut self, messages: Vec<DownwardMessage>) {
        self.dmp.extend(messages);
    }

    /// Appends horizontal messages for a chain, creating its queue on first use.
    pub fn push_horizontal(&mut self, para_id: ParaId, messages: Vec<HorizontalMessage>) {
        self.hrmp.entry(para_id).or_default().extend(messages);
    }

    /// Forms the params for one build.
    ///
    /// Overridden fields are used verbatim. Every other field drains its
    /// buffer, so the same entry is never handed out twice.
    pub fn take_for_build(&mut self, overrides: BuildOverrides) -> BuildBlockParams {
        let BuildOverrides {
            transactions,
            upward_messages,
            downward_messages,
            horizontal_messages,
        } = overrides;

        BuildBlockParams {
            transactions: transactions.unwrap_or_else(|| {
                self.pool
                    .drain(..)
                    .map(|entry| entry.extrinsic)
                    .collect()
            }),
            upward_messages: upward_messages.unwrap_or_else(|| std::mem::take(&mut self.ump)),
            downward_messages: downward_messages
                .unwrap_or_else(|| std::mem::take(&mut self.dmp)),
            horizontal_messages: horizontal_messages
                .unwrap_or_else(|| std::mem::take(&mut self.hrmp)),
        }
    }

    /// Empties every buffer.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.ump.clear();
        self.dmp.clear();
        self.hrmp.clear();
    }

    /// Pending extrinsics in acceptance order.
    pub fn entries(&self) -> &[PoolEntry] {
        &self.pool
    }

    /// Pending extrinsics from one signer, in acceptance order.
    pub fn entries_by<'a>(&'a self, signer: &'a str) -> impl Iterator<Item = &'a PoolEntry> + 'a {
        self.pool.iter().filter(move |entry| entry.signer == signer)
    }

    /// Queued upward messages.
    pub fn ump(&self) -> &UpwardMessages {
        &self.ump
    }

    /// Queued downward messages.
    pub fn dmp(&self) -> &[DownwardMessage] {
        &self.dmp
    }

    /// Queued horizontal messages.
    pub fn hrmp(&self) -> &HorizontalMessages {
        &self.hrmp
    }

    /// Counts per buffer.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            extrinsics: self.pool.len(),
            upward_messages: self.ump.values().map(Vec::len).sum(),
            downward_messages: self.dmp.len(),
            horizontal_messages: self.hrmp.values().map(Vec::len).sum(),
        }
    }
}
