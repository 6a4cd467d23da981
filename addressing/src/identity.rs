// Copyright (c) 2019-2024 The FAT Developers

//! Issuer identity keys.
//!
//! Token issuance and coinbase (mint) entries are authorized by the token
//! issuer's identity keypair rather than a Factoid spending key. The secret
//! key is rendered `sk1…` over a 32-byte Ed25519 seed; the public key is
//! rendered `id1…` over the raw 32-byte public key, so the id1 form is
//! bijective with the key itself.

use crate::{base58, AddressKeyError, Result};
use core::fmt;
use core::str::FromStr;
use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

/// Prefix bytes of a secret `sk1…` rendering.
const SECRET_PREFIX: [u8; 3] = [0x4d, 0xb6, 0xc9];

/// Prefix bytes of a public `id1…` rendering.
const PUBLIC_PREFIX: [u8; 3] = [0x3f, 0xbe, 0xba];

/// An issuer identity secret key, rendered `sk1…`.
///
/// The seed is zeroized when the value is dropped.
#[derive(Clone, Eq, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct IssuerSecretKey {
    seed: [u8; 32],
}

impl IssuerSecretKey {
    /// Wrap a raw 32-byte identity seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { seed }
    }

    /// The raw seed bytes.
    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    /// The Ed25519 signing key derived from the seed.
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.seed)
    }

    /// The public identity key for this secret.
    pub fn public_key(&self) -> IssuerPublicKey {
        IssuerPublicKey(self.signing_key().verifying_key().to_bytes())
    }

    /// Whether `s` parses as an issuer secret key.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }
}

impl FromStr for IssuerSecretKey {
    type Err = AddressKeyError;

    fn from_str(s: &str) -> Result<Self> {
        let mut payload = base58::decode(s, &SECRET_PREFIX, 32)?;
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&payload);
        payload.zeroize();
        Ok(Self { seed })
    }
}

impl fmt::Display for IssuerSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&SECRET_PREFIX, &self.seed))
    }
}

impl fmt::Debug for IssuerSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the seed.
        write!(f, "IssuerSecretKey(sk1…)")
    }
}

/// An issuer identity public key, rendered `id1…`.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IssuerPublicKey([u8; 32]);

impl IssuerPublicKey {
    /// Wrap raw public key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decode as a usable Ed25519 point.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| AddressKeyError::InvalidPublicKey)
    }

    /// Whether `s` parses as an issuer public key.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }
}

impl From<&VerifyingKey> for IssuerPublicKey {
    fn from(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl FromStr for IssuerPublicKey {
    type Err = AddressKeyError;

    fn from_str(s: &str) -> Result<Self> {
        let payload = base58::decode(s, &PUBLIC_PREFIX, 32)?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&payload);
        Ok(Self(bytes))
    }
}

impl fmt::Display for IssuerPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&PUBLIC_PREFIX, &self.0))
    }
}

impl fmt::Debug for IssuerPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IssuerPublicKey({self})")
    }
}
