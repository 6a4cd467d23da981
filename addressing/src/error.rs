// Copyright (c) 2019-2024 The FAT Developers

//! Errors raised by the address and identity key codecs.

use displaydoc::Display;
use serde::{Deserialize, Serialize};

/// Type alias for codec results.
pub type Result<T> = core::result::Result<T, AddressKeyError>;

/// An error that occurs when parsing or converting an address or key.
#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum AddressKeyError {
    /// Value is not valid base58
    Base58,

    /// Checksum mismatch
    InvalidChecksum,

    /// Length mismatch, expected {expected} payload bytes, found {found}
    LengthMismatch {
        /// Expected payload length in bytes.
        expected: usize,
        /// Length actually found.
        found: usize,
    },

    /// Prefix does not match the expected key kind
    WrongPrefix,

    /// Unrecognized RCD type byte `{0}`
    UnknownRcdType(u8),

    /// Public key bytes are not a valid Ed25519 point
    InvalidPublicKey,
}
