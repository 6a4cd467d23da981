// Copyright (c) 2019-2024 The FAT Developers

//! Issuance construction and parsing errors.

use displaydoc::Display;
use fat_transaction_core::ChainId;
use serde::{Deserialize, Serialize};

/// Type alias for issuance results.
pub type IssuanceResult<T> = Result<T, IssuanceError>;

/// An error that occurs when building or parsing an issuance.
#[derive(Clone, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
pub enum IssuanceError {
    /// Supply must be a positive integer or -1 for unlimited, got {0}
    InvalidSupply(i64),

    /// No supply was declared
    MissingSupply,

    /// An issuance needs the issuer secret key (sk1)
    MissingIssuerKey,

    /// Unknown token type `{0}`
    UnknownTokenType(String),

    /// Metadata could not be serialized
    MetadataNotSerializable,

    /// Entry committed to chain {found}, but {expected} was derived
    ChainIdMismatch {
        /// Chain id derived from the token id and issuer chain.
        expected: ChainId,
        /// Chain id the entry actually carries.
        found: ChainId,
    },

    /// Entry could not be parsed: {0}
    MalformedEntry(String),
}
