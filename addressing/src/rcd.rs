// Copyright (c) 2019-2024 The FAT Developers

//! Redeem Condition Datastructures.
//!
//! An RCD states the condition under which an input may be spent. The only
//! deployed type is type 1: a single Ed25519 public key, spendable by a
//! detached signature from the matching secret key. A public Factoid
//! address is the SHA-256d hash of an RCD, so the RCD revealed in an entry
//! binds a signature slot to the input address it spends.

use crate::{AddressKeyError, Result};
use core::fmt;
use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

/// Type byte of an Ed25519 single-signature RCD.
pub const RCD_TYPE_1: u8 = 0x01;

/// Serialized length of a type 1 RCD: type byte plus public key.
const RCD_LENGTH: usize = 33;

/// A type 1 RCD: `0x01 || ed25519_public_key`.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rcd([u8; RCD_LENGTH]);

impl Rcd {
    /// Build the RCD committing to `key`.
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        let mut bytes = [0u8; RCD_LENGTH];
        bytes[0] = RCD_TYPE_1;
        bytes[1..].copy_from_slice(key.as_bytes());
        Rcd(bytes)
    }

    /// The full 33-byte serialized form.
    pub fn as_bytes(&self) -> &[u8; RCD_LENGTH] {
        &self.0
    }

    /// The raw public key bytes committed to by this RCD.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0[1..]);
        out
    }

    /// Decode the committed public key as a usable Ed25519 point.
    pub fn public_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.public_key_bytes())
            .map_err(|_| AddressKeyError::InvalidPublicKey)
    }

    /// SHA-256d of the serialized RCD; the body of the `FA…` rendering.
    pub fn hash(&self) -> [u8; 32] {
        let first = Sha256::digest(self.0);
        let second = Sha256::digest(first);
        second.into()
    }
}

impl TryFrom<&[u8]> for Rcd {
    type Error = AddressKeyError;

    fn try_from(src: &[u8]) -> Result<Rcd> {
        if src.len() != RCD_LENGTH {
            return Err(AddressKeyError::LengthMismatch {
                expected: RCD_LENGTH,
                found: src.len(),
            });
        }
        if src[0] != RCD_TYPE_1 {
            return Err(AddressKeyError::UnknownRcdType(src[0]));
        }
        let mut bytes = [0u8; RCD_LENGTH];
        bytes.copy_from_slice(src);
        Ok(Rcd(bytes))
    }
}

impl fmt::Debug for Rcd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rcd(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    #[test]
    fn rcd_layout() {
        let key = SigningKey::from_bytes(&[3u8; 32]).verifying_key();
        let rcd = Rcd::from_public_key(&key);
        assert_eq!(rcd.as_bytes()[0], RCD_TYPE_1);
        assert_eq!(rcd.public_key_bytes(), key.to_bytes());
        assert_eq!(rcd.public_key().unwrap(), key);
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let mut bytes = [0u8; 33];
        bytes[0] = 0x0e;
        assert_eq!(
            Rcd::try_from(&bytes[..]),
            Err(AddressKeyError::UnknownRcdType(0x0e))
        );
    }

    #[test]
    fn parse_rejects_bad_length() {
        assert!(matches!(
            Rcd::try_from(&[RCD_TYPE_1; 32][..]),
            Err(AddressKeyError::LengthMismatch { .. })
        ));
    }
}
