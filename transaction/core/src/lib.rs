// Copyright (c) 2019-2024 The FAT Developers

#![deny(missing_docs)]
#![deny(unsafe_code)]

//! Transaction data model for the FAT token protocol.
//!
//! This crate holds the parts shared by both token standards: the
//! immutable [`Transaction`] record generic over its amount type
//! ([`u64`] for FAT-0, [`NFTokenIds`] for FAT-1), the canonical [`Entry`]
//! projection it commits to the ledger as, the per-slot Ed25519 signing
//! scheme, chain id derivation, and the id-set algebra backing FAT-1.
//!
//! Transactions are produced by the builder crate; everything here is
//! read-only once constructed and safe to share across threads.

mod amount;
mod chain_id;
mod entry;
mod error;
mod nf_token_ids;
mod signing;
mod tx;
mod validation;

pub use crate::{
    amount::TokenAmount,
    chain_id::ChainId,
    entry::Entry,
    error::{AddressRole, TransactionError, TransactionResult},
    nf_token_ids::{IdSetError, NFTokenIdElement, NFTokenIds, NFTokenMetadataEntry},
    signing::{signing_digest, signing_preimage, InputSignature},
    tx::{Fat0Transaction, Fat1Transaction, Input, Output, Transaction, TransactionParams},
};
