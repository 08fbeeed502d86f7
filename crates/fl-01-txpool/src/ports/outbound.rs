//! Outbound (Driven) ports for the pool subsystem.

use crate::domain::TxPoolError;
use async_trait::async_trait;
use shared_types::entities::Extrinsic;

/// Resolves who signed an extrinsic.
///
/// Decoding depends on the chain's current type registry, which is why this
/// sits outside the pool.
#[async_trait]
pub trait SignerResolver: Send + Sync {
    /// Returns the signer identity.
    ///
    /// # Errors
    /// - `Decode`: the payload is malformed under the current registry
    async fn resolve_signer(&self, extrinsic: &Extrinsic) -> Result<String, TxPoolError>;
}

/// Resolver that treats the leading bytes of a payload as its signer.
///
/// Payloads shorter than the prefix fail to decode.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub struct PrefixSignerResolver {
    prefix_len: usize,
}

#[cfg(any(test, feature = "test-utils"))]
impl PrefixSignerResolver {
    /// One-byte signer prefix.
    pub fn new() -> Self {
        Self { prefix_len: 1 }
    }

    /// Signer prefix of `prefix_len` bytes.
    pub fn with_prefix_len(prefix_len: usize) -> Self {
        Self { prefix_len }
    }

    /// Signer identity the resolver reports for payloads starting with `prefix`.
    pub fn signer_for(prefix: &[u8]) -> String {
        shared_types::entities::HexBytes::from(prefix).to_hex()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for PrefixSignerResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl SignerResolver for PrefixSignerResolver {
    async fn resolve_signer(&self, extrinsic: &Extrinsic) -> Result<String, TxPoolError> {
        let bytes = extrinsic.as_bytes();
        if bytes.is_empty() || bytes.len() < self.prefix_len {
            return Err(TxPoolError::Decode(format!(
                "expected at least {} bytes, got {}",
                self.prefix_len.max(1),
                bytes.len()
            )));
        }
        Ok(Self::signer_for(&bytes[..self.prefix_len]))
    }
}
