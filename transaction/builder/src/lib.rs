// Copyright (c) 2019-2024 The FAT Developers

#![deny(missing_docs)]
#![deny(unsafe_code)]

//! Fluent assembly of FAT transactions.
//!
//! [`TransactionBuilder`] collects inputs, outputs, metadata and signing
//! keys, then freezes the lot into an immutable
//! [`Transaction`](fat_transaction_core::Transaction) at [`build`].
//!
//! Two signing flows are supported:
//!
//! * **Single pass**: inputs are given as private addresses (the issuer's
//!   `sk1` for a coinbase) and every slot is signed inside `build`.
//! * **Two pass**: inputs are given as public addresses (`id1` for a
//!   coinbase), `build` yields an unsigned transaction whose digests are
//!   handed to an external signer, and a second builder seeded with
//!   [`TransactionBuilder::for_external_signing`] accepts the produced
//!   signatures and builds the signed transaction. The timestamp, content
//!   and input order are frozen by the first pass, so both passes sign the
//!   same digests.
//!
//! [`build`]: TransactionBuilder::build

mod transaction_builder;

pub use crate::transaction_builder::{Fat0Builder, Fat1Builder, TransactionBuilder};
