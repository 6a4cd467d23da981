// Copyright (c) 2019-2024 The FAT Developers

//! Per-slot signing.
//!
//! Each input of a transaction occupies one signature slot. The message
//! committed to by slot `i` is
//!
//! ```text
//! SHA-512( ascii(i) || ascii(unix_seconds) || chain_id || content )
//! ```
//!
//! and the Ed25519 detached signature is taken over the 64-byte digest
//! itself, not the preimage. The timestamp and content bytes are fixed
//! across every slot of one transaction, so externally produced signatures
//! over the same digest interchange freely with locally produced ones.

use crate::{AddressRole, ChainId, TransactionError, TransactionResult};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use fat_addressing::Rcd;
use sha2::{Digest, Sha512};

/// The exact byte string hashed for signature slot `position`.
pub fn signing_preimage(
    position: usize,
    timestamp: u64,
    chain_id: &ChainId,
    content: &[u8],
) -> Vec<u8> {
    let position = position.to_string();
    let timestamp = timestamp.to_string();
    let mut out =
        Vec::with_capacity(position.len() + timestamp.len() + 32 + content.len());
    out.extend_from_slice(position.as_bytes());
    out.extend_from_slice(timestamp.as_bytes());
    out.extend_from_slice(chain_id.as_bytes());
    out.extend_from_slice(content);
    out
}

/// The 64-byte digest signed for slot `position`.
pub fn signing_digest(
    position: usize,
    timestamp: u64,
    chain_id: &ChainId,
    content: &[u8],
) -> [u8; 64] {
    Sha512::digest(signing_preimage(position, timestamp, chain_id, content)).into()
}

/// A filled signature slot: the revealed RCD and the detached signature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputSignature {
    rcd: Rcd,
    signature: Signature,
}

impl InputSignature {
    /// Pair an RCD with an externally produced signature.
    pub fn new(rcd: Rcd, signature: Signature) -> Self {
        Self { rcd, signature }
    }

    /// Sign slot `position` with `key`, revealing its RCD.
    pub fn sign(
        key: &SigningKey,
        position: usize,
        timestamp: u64,
        chain_id: &ChainId,
        content: &[u8],
    ) -> Self {
        let digest = signing_digest(position, timestamp, chain_id, content);
        Self {
            rcd: Rcd::from_public_key(&key.verifying_key()),
            signature: key.sign(&digest),
        }
    }

    /// The revealed RCD.
    pub fn rcd(&self) -> &Rcd {
        &self.rcd
    }

    /// The detached signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Recompute the slot digest and verify the signature against the RCD's
    /// key. A mismatched signature is `Ok(false)`; an RCD whose key bytes do
    /// not decode is an error.
    pub fn verify(
        &self,
        position: usize,
        timestamp: u64,
        chain_id: &ChainId,
        content: &[u8],
    ) -> TransactionResult<bool> {
        let key = self
            .rcd
            .public_key()
            .map_err(|_| TransactionError::InvalidAddress(AddressRole::Input))?;
        let digest = signing_digest(position, timestamp, chain_id, content);
        Ok(key.verify(&digest, &self.signature).is_ok())
    }
}
