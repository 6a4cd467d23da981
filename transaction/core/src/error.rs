// Copyright (c) 2019-2024 The FAT Developers

//! Transaction validation and construction errors.

use crate::nf_token_ids::IdSetError;
use displaydoc::Display;
use serde::{Deserialize, Serialize};

/// Type alias for transaction results.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// The role an address was playing when it failed validation.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum AddressRole {
    /// input
    Input,
    /// output
    Output,
    /// issuer
    Issuer,
}

/// Reasons a transaction may fail to construct or validate.
///
/// Every variant terminates the operation that raised it; no partial
/// transaction is ever returned. Signature mismatch is deliberately absent:
/// [`Transaction::validate_signatures`](crate::Transaction::validate_signatures)
/// reports it as a `false` return instead.
#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum TransactionError {
    /// Token chain id is not 64 hex characters
    InvalidChainId,

    /// Invalid address used as {0}
    InvalidAddress(AddressRole),

    /// Invalid non-fungible token id set: {0}
    InvalidIdSet(IdSetError),

    /// Amounts must be positive
    InvalidAmount,

    /// Input and output totals do not balance
    BalanceMismatch,

    /// Balance computation overflowed
    BalanceOverflow,

    /// An address appears in both inputs and outputs
    AddressAppearsOnBothSides,

    /// A transaction must have at least one input.
    NoInputs,

    /// A transaction must have at least one output.
    NoOutputs,

    /// A coinbase input must be the sole input
    CoinbaseWithExtraInputs,

    /// At most one burn output is permitted
    DuplicateBurnOutput,

    /// A coinbase transaction needs an issuer key (sk1 or id1)
    MissingIssuerKey,

    /// Issuer key is invalid or ambiguous
    InvalidIssuerKey,

    /// Token metadata is only permitted on coinbase transactions
    TokenMetadataNotCoinbase,

    /// Metadata could not be serialized
    MetadataNotSerializable,

    /// Signature slot {0} is empty
    MissingSignature(usize),

    /// Supplied public key matches no input address
    UnknownPublicKey,

    /// Signature was supplied for a different issuer identity key
    Id1Mismatch,

    /// Builder is finalized; only signature slots may be filled
    BuilderFinalized,

    /// Entry could not be parsed: {0}
    MalformedEntry(String),
}

impl From<IdSetError> for TransactionError {
    fn from(src: IdSetError) -> Self {
        Self::InvalidIdSet(src)
    }
}
