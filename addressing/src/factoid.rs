// Copyright (c) 2019-2024 The FAT Developers

//! Factoid spending addresses.
//!
//! A private address wraps a 32-byte Ed25519 seed. Its public counterpart
//! does not expose the public key directly: the `FA…` rendering wraps the
//! SHA-256d hash of the type 1 RCD built from the key, so the key itself is
//! only revealed when an entry spending the address is published.

use crate::{base58, AddressKeyError, Rcd, Result};
use core::fmt;
use core::str::FromStr;
use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

/// The reserved public address marking coinbase inputs and burn outputs.
pub const COINBASE_PUBLIC: &str = "FA1zT4aFpEvcnPqPCigB3fvGu4Q4mTXY22iiuV69DqE1pNhdF2MC";

/// The reserved private address whose seed is all zeroes; its public image
/// is [`COINBASE_PUBLIC`].
pub const COINBASE_PRIVATE: &str = "Fs1KWJrpLdfucvmYwN2nWrwepLn8ercpMbzXshd1g8zyhKXLVLWj";

/// Prefix bytes of a public `FA…` rendering.
const PUBLIC_PREFIX: [u8; 2] = [0x5f, 0xb1];

/// Prefix bytes of a private `Fs…` rendering.
const PRIVATE_PREFIX: [u8; 2] = [0x64, 0x78];

/// RCD hash of the coinbase sentinel, i.e. of `0x01 || pk(zero seed)`.
const COINBASE_RCD_HASH: [u8; 32] = [
    0x03, 0x1c, 0xce, 0x24, 0xbc, 0xc4, 0x3b, 0x59, 0x6a, 0xf1, 0x05, 0x16, 0x7d, 0xe2, 0xc0,
    0x36, 0x03, 0xc2, 0x0a, 0xda, 0x33, 0x14, 0xa7, 0xcf, 0xb4, 0x7b, 0xef, 0xca, 0xd4, 0x88,
    0x3e, 0x6f,
];

/// A public Factoid address: the SHA-256d hash of an RCD, rendered `FA…`.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PublicAddress {
    rcd_hash: [u8; 32],
}

impl PublicAddress {
    /// Wrap an already-computed RCD hash.
    pub fn from_rcd_hash(rcd_hash: [u8; 32]) -> Self {
        Self { rcd_hash }
    }

    /// The address committing to `key` under a type 1 RCD.
    pub fn of_public_key(key: &VerifyingKey) -> Self {
        Self {
            rcd_hash: Rcd::from_public_key(key).hash(),
        }
    }

    /// The reserved coinbase/burn sentinel address.
    pub fn coinbase() -> Self {
        Self {
            rcd_hash: COINBASE_RCD_HASH,
        }
    }

    /// Whether this is the reserved coinbase/burn sentinel.
    pub fn is_coinbase(&self) -> bool {
        self.rcd_hash == COINBASE_RCD_HASH
    }

    /// The wrapped RCD hash.
    pub fn rcd_hash(&self) -> &[u8; 32] {
        &self.rcd_hash
    }

    /// Whether `s` parses as a public Factoid address.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }
}

impl FromStr for PublicAddress {
    type Err = AddressKeyError;

    fn from_str(s: &str) -> Result<Self> {
        let payload = base58::decode(s, &PUBLIC_PREFIX, 32)?;
        let mut rcd_hash = [0u8; 32];
        rcd_hash.copy_from_slice(&payload);
        Ok(Self { rcd_hash })
    }
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&PUBLIC_PREFIX, &self.rcd_hash))
    }
}

impl fmt::Debug for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicAddress({self})")
    }
}

/// A private Factoid address: a 32-byte Ed25519 seed, rendered `Fs…`.
///
/// The seed is zeroized when the value is dropped.
#[derive(Clone, Eq, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct PrivateAddress {
    seed: [u8; 32],
}

impl PrivateAddress {
    /// Wrap a raw 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { seed }
    }

    /// The reserved all-zero-seed sentinel, [`COINBASE_PRIVATE`].
    pub fn coinbase() -> Self {
        Self { seed: [0u8; 32] }
    }

    /// The raw seed bytes.
    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    /// The Ed25519 signing key derived from the seed.
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.seed)
    }

    /// The public image of this address.
    pub fn public_address(&self) -> PublicAddress {
        PublicAddress::of_public_key(&self.signing_key().verifying_key())
    }

    /// Whether `s` parses as a private Factoid address.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }
}

impl FromStr for PrivateAddress {
    type Err = AddressKeyError;

    fn from_str(s: &str) -> Result<Self> {
        let mut payload = base58::decode(s, &PRIVATE_PREFIX, 32)?;
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&payload);
        payload.zeroize();
        Ok(Self { seed })
    }
}

impl fmt::Display for PrivateAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&PRIVATE_PREFIX, &self.seed))
    }
}

impl fmt::Debug for PrivateAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the seed.
        write!(f, "PrivateAddress(Fs…)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    #[test]
    fn coinbase_sentinels_are_consistent() {
        let private = PrivateAddress::coinbase();
        assert_eq!(private.to_string(), COINBASE_PRIVATE);
        assert_eq!(private.seed(), &[0u8; 32]);

        let public = private.public_address();
        assert_eq!(public, PublicAddress::coinbase());
        assert_eq!(public.to_string(), COINBASE_PUBLIC);
        assert!(public.is_coinbase());
    }

    #[test]
    fn parse_render_roundtrip() {
        let mut rng = StdRng::from_seed([9u8; 32]);
        for _ in 0..8 {
            let mut seed = [0u8; 32];
            rng.fill_bytes(&mut seed);
            let private = PrivateAddress::from_seed(seed);
            let reparsed: PrivateAddress = private.to_string().parse().unwrap();
            assert_eq!(reparsed, private);

            let public = private.public_address();
            let reparsed: PublicAddress = public.to_string().parse().unwrap();
            assert_eq!(reparsed, public);
            assert!(!public.is_coinbase());
        }
    }

    #[test]
    fn known_address_fixtures() {
        let private: PrivateAddress = "Fs1PkAEbmo1XNangSnxmKqi1PN5sVDbQ6zsnXCsMUejT66WaDgkm"
            .parse()
            .unwrap();
        assert_eq!(
            private.public_address().to_string(),
            "FA2Qwmzp4xeXR4jWYrQnbPSXi5wLdVHy8p3ksAVSvyjLEX7jE3pN"
        );
        assert!(PublicAddress::is_valid(
            "FA3aECpw3gEZ7CMQvRNxEtKBGKAos3922oqYLcHQ9NqXHudC6YBM"
        ));
    }

    #[test]
    fn classification_is_strict() {
        // A public rendering does not parse as private, and vice versa.
        assert!(!PrivateAddress::is_valid(COINBASE_PUBLIC));
        assert!(!PublicAddress::is_valid(COINBASE_PRIVATE));
        assert!(!PublicAddress::is_valid("not an address"));
    }
}
