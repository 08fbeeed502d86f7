//! # Core Domain Entities
//!
//! Defines the payload and block-building types shared by the transaction
//! pool, the block miner and the event bus.
//!
//! ## Clusters
//!
//! - **Payloads**: `HexBytes`, `Extrinsic`
//! - **Cross-chain messages**: `ParaId`, `DownwardMessage`, `HorizontalMessage`
//! - **Block building**: `BuildBlockParams`, `Block`

use crate::errors::TypeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// Re-export H256 from primitive-types for block hashes across all subsystems
pub use primitive_types::H256;

/// Bytes shown before truncation in debug output.
const DEBUG_PREVIEW_BYTES: usize = 16;

// =============================================================================
// CLUSTER A: PAYLOADS
// =============================================================================

/// An opaque byte payload carried as a `0x`-prefixed hex string on the wire.
///
/// The debug representation truncates long payloads so extrinsics can be
/// logged without flooding the output.
#[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct HexBytes(Vec<u8>);

impl HexBytes {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the raw bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the payload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Full `0x`-prefixed hex encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for HexBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for HexBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for HexBytes {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(digits)
            .map(Self)
            .map_err(|e| TypeError::InvalidHex(e.to_string()))
    }
}

impl fmt::Display for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= DEBUG_PREVIEW_BYTES {
            return write!(f, "0x{}", hex::encode(&self.0));
        }
        write!(
            f,
            "0x{}..({} bytes)",
            hex::encode(&self.0[..DEBUG_PREVIEW_BYTES]),
            self.0.len()
        )
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An encoded, signed transaction. Its internal format is opaque here.
pub type Extrinsic = HexBytes;

// =============================================================================
// CLUSTER B: CROSS-CHAIN MESSAGES
// =============================================================================

/// Identifier of a chain in the relay/parachain hierarchy.
pub type ParaId = u32;

/// Message sent down from the parent chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownwardMessage {
    /// Parent block number the message was sent at.
    pub sent_at: u32,
    /// Encoded message.
    pub msg: HexBytes,
}

/// Message sent by a sibling chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalMessage {
    /// Block number the message was sent at.
    pub sent_at: u32,
    /// Encoded message.
    pub data: HexBytes,
}

/// Upward messages keyed by origin chain.
pub type UpwardMessages = BTreeMap<ParaId, Vec<HexBytes>>;

/// Horizontal messages keyed by origin chain.
pub type HorizontalMessages = BTreeMap<ParaId, Vec<HorizontalMessage>>;

// =============================================================================
// CLUSTER C: BLOCK BUILDING
// =============================================================================

/// Everything one block build consumes.
///
/// Order within each collection is submission order and is never changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildBlockParams {
    /// Transactions to apply, in order.
    pub transactions: Vec<Extrinsic>,
    /// Upward messages per origin chain.
    pub upward_messages: UpwardMessages,
    /// Downward messages, in order.
    pub downward_messages: Vec<DownwardMessage>,
    /// Horizontal messages per origin chain.
    pub horizontal_messages: HorizontalMessages,
}

impl BuildBlockParams {
    /// True if there is nothing to put in a block besides inherents.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
            && self.downward_messages.is_empty()
            && self.upward_messages.values().all(Vec::is_empty)
            && self.horizontal_messages.values().all(Vec::is_empty)
    }

    /// Total number of queued cross-chain messages.
    pub fn message_count(&self) -> usize {
        self.downward_messages.len()
            + self.upward_messages.values().map(Vec::len).sum::<usize>()
            + self.horizontal_messages.values().map(Vec::len).sum::<usize>()
    }
}

/// A block as committed to the chain head.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Height in the chain.
    pub number: u64,
    /// Block hash.
    pub hash: H256,
    /// Hash of the parent block.
    pub parent_hash: H256,
    /// Inherents followed by applied transactions.
    pub extrinsics: Vec<Extrinsic>,
}

impl Block {
    /// A parentless block at height zero.
    pub fn genesis(hash: H256) -> Self {
        Self {
            number: 0,
            hash,
            parent_hash: H256::zero(),
            extrinsics: Vec::new(),
        }
    }
}
