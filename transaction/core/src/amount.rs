// Copyright (c) 2019-2024 The FAT Developers

//! Per-standard amount rules.
//!
//! FAT-0 and FAT-1 transactions share one data model; the only points that
//! differ are what an amount *is* and what "inputs balance outputs" means.
//! [`TokenAmount`] captures exactly those two points: `u64` for fungible
//! amounts, [`NFTokenIds`] for non-fungible id sets.

use crate::{NFTokenIds, TransactionError, TransactionResult};
use core::fmt;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The amount type of a token standard.
pub trait TokenAmount: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Whether the standard admits per-range token metadata on coinbase
    /// transactions.
    const SUPPORTS_TOKEN_METADATA: bool;

    /// Validate a single input or output amount.
    fn validate(&self) -> TransactionResult<()>;

    /// Check that the input total equals the output total.
    fn check_balance(inputs: &[Self], outputs: &[Self]) -> TransactionResult<()>;
}

/// FAT-0: positive integer amounts, balanced by checked summation.
impl TokenAmount for u64 {
    const SUPPORTS_TOKEN_METADATA: bool = false;

    fn validate(&self) -> TransactionResult<()> {
        if *self == 0 {
            return Err(TransactionError::InvalidAmount);
        }
        Ok(())
    }

    fn check_balance(inputs: &[Self], outputs: &[Self]) -> TransactionResult<()> {
        let sum = |amounts: &[u64]| -> TransactionResult<u64> {
            amounts.iter().try_fold(0u64, |acc, amount| {
                acc.checked_add(*amount)
                    .ok_or(TransactionError::BalanceOverflow)
            })
        };
        if sum(inputs)? != sum(outputs)? {
            return Err(TransactionError::BalanceMismatch);
        }
        Ok(())
    }
}

/// FAT-1: non-empty id sets, balanced as sets.
///
/// Balance is checked on canonical reduced forms, so ranges are never
/// materialized; ids covered twice across the inputs (or outputs) surface
/// as an overlap error.
impl TokenAmount for NFTokenIds {
    const SUPPORTS_TOKEN_METADATA: bool = true;

    fn validate(&self) -> TransactionResult<()> {
        if self.is_empty() {
            return Err(TransactionError::InvalidAmount);
        }
        Ok(())
    }

    fn check_balance(inputs: &[Self], outputs: &[Self]) -> TransactionResult<()> {
        let input_ids = NFTokenIds::union_of(inputs)?.reduce();
        let output_ids = NFTokenIds::union_of(outputs)?.reduce();
        if input_ids != output_ids {
            return Err(TransactionError::BalanceMismatch);
        }
        Ok(())
    }
}
