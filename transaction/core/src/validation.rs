// Copyright (c) 2019-2024 The FAT Developers

//! Structural transaction validation.
//!
//! Every rule here is enforced before a [`Transaction`](crate::Transaction)
//! is constructed; a constructed transaction therefore satisfies all of
//! them. Each helper checks one rule and returns the matching
//! [`TransactionError`] kind.

use crate::tx::{Input, Output};
use crate::{
    AddressRole, NFTokenIds, NFTokenMetadataEntry, TokenAmount, TransactionError,
    TransactionResult,
};
use fat_addressing::PublicAddress;

pub(crate) fn validate_structure<A: TokenAmount>(
    inputs: &[Input<A>],
    outputs: &[Output<A>],
    token_metadata: Option<&[NFTokenMetadataEntry]>,
) -> TransactionResult<()> {
    validate_non_empty(inputs, outputs)?;
    validate_amounts(inputs, outputs)?;
    validate_sentinel_usage(inputs, outputs)?;
    validate_coinbase_sole_input(inputs)?;
    validate_single_burn(outputs)?;
    validate_unique_addresses(inputs, outputs)?;
    validate_sides_disjoint(inputs, outputs)?;
    validate_balance(inputs, outputs)?;
    validate_token_metadata::<A>(inputs, token_metadata)?;
    Ok(())
}

fn validate_non_empty<A>(inputs: &[Input<A>], outputs: &[Output<A>]) -> TransactionResult<()> {
    if inputs.is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if outputs.is_empty() {
        return Err(TransactionError::NoOutputs);
    }
    Ok(())
}

fn validate_amounts<A: TokenAmount>(
    inputs: &[Input<A>],
    outputs: &[Output<A>],
) -> TransactionResult<()> {
    for input in inputs {
        input.amount().validate()?;
    }
    for output in outputs {
        output.amount().validate()?;
    }
    Ok(())
}

/// The coinbase sentinel may only appear through the dedicated
/// `Coinbase`/`Burn` variants, never as an ordinary address.
fn validate_sentinel_usage<A>(
    inputs: &[Input<A>],
    outputs: &[Output<A>],
) -> TransactionResult<()> {
    for input in inputs {
        if let Input::Address { address, .. } = input {
            if address.is_coinbase() {
                return Err(TransactionError::InvalidAddress(AddressRole::Input));
            }
        }
    }
    for output in outputs {
        if let Output::Address { address, .. } = output {
            if address.is_coinbase() {
                return Err(TransactionError::InvalidAddress(AddressRole::Output));
            }
        }
    }
    Ok(())
}

fn validate_coinbase_sole_input<A>(inputs: &[Input<A>]) -> TransactionResult<()> {
    if inputs.iter().any(Input::is_coinbase) && inputs.len() > 1 {
        return Err(TransactionError::CoinbaseWithExtraInputs);
    }
    Ok(())
}

fn validate_single_burn<A>(outputs: &[Output<A>]) -> TransactionResult<()> {
    if outputs.iter().filter(|output| output.is_burn()).count() > 1 {
        return Err(TransactionError::DuplicateBurnOutput);
    }
    Ok(())
}

/// Inputs and outputs are maps keyed by address; a key may appear once.
fn validate_unique_addresses<A>(
    inputs: &[Input<A>],
    outputs: &[Output<A>],
) -> TransactionResult<()> {
    if has_duplicates(inputs.iter().map(Input::address)) {
        return Err(TransactionError::InvalidAddress(AddressRole::Input));
    }
    if has_duplicates(outputs.iter().map(Output::address)) {
        return Err(TransactionError::InvalidAddress(AddressRole::Output));
    }
    Ok(())
}

fn has_duplicates(addresses: impl Iterator<Item = PublicAddress>) -> bool {
    let mut seen: Vec<PublicAddress> = addresses.collect();
    seen.sort();
    seen.windows(2).any(|pair| pair[0] == pair[1])
}

fn validate_sides_disjoint<A>(
    inputs: &[Input<A>],
    outputs: &[Output<A>],
) -> TransactionResult<()> {
    for input in inputs {
        let address = input.address();
        if outputs.iter().any(|output| output.address() == address) {
            return Err(TransactionError::AddressAppearsOnBothSides);
        }
    }
    Ok(())
}

fn validate_balance<A: TokenAmount>(
    inputs: &[Input<A>],
    outputs: &[Output<A>],
) -> TransactionResult<()> {
    let input_amounts: Vec<A> = inputs.iter().map(|input| input.amount().clone()).collect();
    let output_amounts: Vec<A> = outputs
        .iter()
        .map(|output| output.amount().clone())
        .collect();
    A::check_balance(&input_amounts, &output_amounts)
}

fn validate_token_metadata<A: TokenAmount>(
    inputs: &[Input<A>],
    token_metadata: Option<&[NFTokenMetadataEntry]>,
) -> TransactionResult<()> {
    let Some(entries) = token_metadata else {
        return Ok(());
    };
    if !A::SUPPORTS_TOKEN_METADATA || !inputs.iter().any(Input::is_coinbase) {
        return Err(TransactionError::TokenMetadataNotCoinbase);
    }
    // The ids named across all records must form one valid (disjoint) set.
    NFTokenIds::union_of(entries.iter().map(NFTokenMetadataEntry::ids))?;
    Ok(())
}
