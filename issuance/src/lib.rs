// Copyright (c) 2019-2024 The FAT Developers

#![deny(missing_docs)]
#![deny(unsafe_code)]

//! Token issuance records for the FAT token protocol.
//!
//! An [`Issuance`] declares a token: its standard, supply and optional
//! symbol and metadata. It is built with [`IssuanceBuilder`] and signed
//! solely by the issuer's identity key, or parsed back from an existing
//! ledger entry as a read-only accessor bag.

mod error;
mod issuance;

pub use crate::{
    error::{IssuanceError, IssuanceResult},
    issuance::{Issuance, IssuanceBuilder, TokenType, UNLIMITED_SUPPLY},
};
