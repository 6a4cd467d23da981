// Copyright (c) 2019-2024 The FAT Developers

#![deny(missing_docs)]
#![deny(unsafe_code)]

//! Address and identity key codecs for the FAT token protocol.
//!
//! FAT entries are authorized by two distinct key families, both rendered
//! as base58check strings with fixed prefixes:
//!
//! * Factoid spending keys: a private address (`Fs…`) wraps a 32-byte
//!   Ed25519 seed, and its public counterpart (`FA…`) wraps the SHA-256d
//!   hash of the RCD built from the derived public key.
//! * Issuer identity keys: the token issuer's secret key (`sk1…`) wraps a
//!   32-byte Ed25519 seed and its public counterpart (`id1…`) wraps the raw
//!   public key. These authorize coinbase (mint) entries and issuances.
//!
//! The reserved coinbase sentinels are ordinary addresses over the all-zero
//! seed; [`PublicAddress::coinbase`] is the public image of
//! [`PrivateAddress::coinbase`].

mod base58;
mod error;
mod factoid;
mod identity;
mod rcd;

pub use crate::{
    error::{AddressKeyError, Result},
    factoid::{PrivateAddress, PublicAddress, COINBASE_PRIVATE, COINBASE_PUBLIC},
    identity::{IssuerPublicKey, IssuerSecretKey},
    rcd::{Rcd, RCD_TYPE_1},
};
