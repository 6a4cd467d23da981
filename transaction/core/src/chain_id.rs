// Copyright (c) 2019-2024 The FAT Developers

//! Chain identifiers.
//!
//! A chain id names a stream of entries on the underlying ledger. It is the
//! SHA-256 hash of the concatenated SHA-256 digests of the first entry's
//! ext-ids; a token's chain id is derived from the token id and the issuer's
//! root chain.

use crate::{TransactionError, TransactionResult};
use core::fmt;
use core::str::FromStr;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// A 32-byte ledger chain identifier, rendered as 64 lowercase hex chars.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ChainId([u8; 32]);

impl ChainId {
    /// Wrap raw chain id bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw chain id bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The ledger's chain-id function: SHA-256 over the concatenated
    /// SHA-256 digests of the chain's first-entry ext-ids.
    pub fn of_ext_ids<I, B>(ext_ids: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for ext_id in ext_ids {
            hasher.update(Sha256::digest(ext_id.as_ref()));
        }
        Self(hasher.finalize().into())
    }

    /// Derive the chain id of a token issued under `issuer_chain_id`.
    pub fn for_token(token_id: &str, issuer_chain_id: &ChainId) -> Self {
        Self::of_ext_ids([
            token_id.as_bytes(),
            b"0".as_slice(),
            issuer_chain_id.as_bytes().as_slice(),
        ])
    }

    /// Whether `s` is a well-formed chain id rendering.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }
}

impl FromStr for ChainId {
    type Err = TransactionError;

    fn from_str(s: &str) -> TransactionResult<Self> {
        if s.len() != 64 {
            return Err(TransactionError::InvalidChainId);
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| TransactionError::InvalidChainId)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({self})")
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
