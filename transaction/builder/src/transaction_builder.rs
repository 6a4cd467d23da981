// Copyright (c) 2019-2024 The FAT Developers

//! The transaction builder state machine.

use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use fat_addressing::{IssuerPublicKey, IssuerSecretKey, PrivateAddress, PublicAddress, Rcd};
use fat_transaction_core::{
    AddressRole, ChainId, Input, InputSignature, NFTokenIds, NFTokenMetadataEntry, Output,
    TokenAmount, Transaction, TransactionError, TransactionParams, TransactionResult,
};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// How a reserved signature slot gets filled at `build`.
enum SlotSigner {
    /// Signed inside `build` with the key of the input's private address.
    Key(Box<SigningKey>),
    /// Signed inside `build` with the issuer's `sk1`, or left for an
    /// external `id1` signature.
    Issuer,
    /// Left for an external `pk_signature`.
    External,
}

/// Scratch state while the transaction is being assembled.
struct Assembling<A> {
    chain_id: ChainId,
    timestamp: Option<u64>,
    inputs: Vec<Input<A>>,
    signers: Vec<SlotSigner>,
    outputs: Vec<Output<A>>,
    metadata: Option<serde_json::Value>,
    token_metadata: Option<Vec<NFTokenMetadataEntry>>,
    issuer_secret: Option<IssuerSecretKey>,
    issuer_public: Option<IssuerPublicKey>,
}

/// State while an unsigned transaction waits for external signatures.
struct AwaitingSignatures<A: TokenAmount> {
    tx: Transaction<A>,
    slots: Vec<Option<InputSignature>>,
}

enum State<A: TokenAmount> {
    Assembling(Assembling<A>),
    AwaitingSignatures(AwaitingSignatures<A>),
}

/// Fluent builder for FAT transactions.
///
/// Mutators consume and return the builder so misuse is rejected at the
/// offending call; `build` consumes it for good.
pub struct TransactionBuilder<A: TokenAmount> {
    state: State<A>,
}

/// Builder for fungible (FAT-0) transactions.
pub type Fat0Builder = TransactionBuilder<u64>;

/// Builder for non-fungible (FAT-1) transactions.
pub type Fat1Builder = TransactionBuilder<NFTokenIds>;

impl<A: TokenAmount> TransactionBuilder<A> {
    /// Start assembling a transaction on `chain_id`.
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            state: State::Assembling(Assembling {
                chain_id,
                timestamp: None,
                inputs: Vec::new(),
                signers: Vec::new(),
                outputs: Vec::new(),
                metadata: None,
                token_metadata: None,
                issuer_secret: None,
                issuer_public: None,
            }),
        }
    }

    /// Seed a builder with an unsigned transaction from a first pass; only
    /// [`pk_signature`](Self::pk_signature) and
    /// [`id1_signature`](Self::id1_signature) are accepted until `build`.
    pub fn for_external_signing(tx: Transaction<A>) -> Self {
        let slots = vec![None; tx.inputs().len()];
        Self {
            state: State::AwaitingSignatures(AwaitingSignatures { tx, slots }),
        }
    }

    /// Add an input spending `amount` from `address`, signed at `build`.
    pub fn input(mut self, address: &PrivateAddress, amount: A) -> TransactionResult<Self> {
        let state = self.assembling()?;
        let public = address.public_address();
        if public.is_coinbase() {
            return Err(TransactionError::InvalidAddress(AddressRole::Input));
        }
        let key = address.signing_key();
        state.push_input(
            Input::Address {
                address: public,
                amount,
            },
            SlotSigner::Key(Box::new(key)),
        )?;
        Ok(self)
    }

    /// Add an input spending `amount` from `address`, to be signed
    /// externally in a second pass.
    pub fn external_input(mut self, address: PublicAddress, amount: A) -> TransactionResult<Self> {
        let state = self.assembling()?;
        if address.is_coinbase() {
            return Err(TransactionError::InvalidAddress(AddressRole::Input));
        }
        state.push_input(Input::Address { address, amount }, SlotSigner::External)?;
        Ok(self)
    }

    /// Add the minting input. Requires an empty input list, and an issuer
    /// key (`sk1` or `id1`) by `build` time.
    pub fn coinbase_input(mut self, amount: A) -> TransactionResult<Self> {
        let state = self.assembling()?;
        if !state.inputs.is_empty() {
            return Err(TransactionError::CoinbaseWithExtraInputs);
        }
        state.push_input(Input::Coinbase { amount }, SlotSigner::Issuer)?;
        Ok(self)
    }

    /// Add an output paying `amount` to `address`.
    pub fn output(mut self, address: PublicAddress, amount: A) -> TransactionResult<Self> {
        let state = self.assembling()?;
        if address.is_coinbase() {
            return Err(TransactionError::InvalidAddress(AddressRole::Output));
        }
        state.push_output(Output::Address { address, amount })?;
        Ok(self)
    }

    /// Add the burning output. At most one is permitted.
    pub fn burn_output(mut self, amount: A) -> TransactionResult<Self> {
        let state = self.assembling()?;
        if state.outputs.iter().any(Output::is_burn) {
            return Err(TransactionError::DuplicateBurnOutput);
        }
        state.push_output(Output::Burn { amount })?;
        Ok(self)
    }

    /// Attach free-form metadata to the transaction content.
    pub fn metadata<M: Serialize>(mut self, metadata: M) -> TransactionResult<Self> {
        let value = serde_json::to_value(metadata)
            .map_err(|_| TransactionError::MetadataNotSerializable)?;
        self.assembling()?.metadata = Some(value);
        Ok(self)
    }

    /// Declare the issuer secret key signing a coinbase inside `build`.
    pub fn sk1(mut self, key: IssuerSecretKey) -> TransactionResult<Self> {
        self.assembling()?.issuer_secret = Some(key);
        Ok(self)
    }

    /// Declare the issuer public key for external coinbase signing; the
    /// matching signature is supplied in the second pass via
    /// [`id1_signature`](Self::id1_signature).
    pub fn id1(mut self, key: IssuerPublicKey) -> TransactionResult<Self> {
        self.assembling()?.issuer_public = Some(key);
        Ok(self)
    }

    /// Pin the signing timestamp (Unix seconds) instead of sampling the
    /// clock at `build`.
    pub fn timestamp(mut self, unix_seconds: u64) -> TransactionResult<Self> {
        self.assembling()?.timestamp = Some(unix_seconds);
        Ok(self)
    }

    /// Supply an externally produced signature for the input spending the
    /// address of `public_key`.
    pub fn pk_signature(
        mut self,
        public_key: &VerifyingKey,
        signature: Signature,
    ) -> TransactionResult<Self> {
        let state = self.awaiting()?;
        let address = PublicAddress::of_public_key(public_key);
        let position = state
            .tx
            .inputs()
            .iter()
            .position(|input| !input.is_coinbase() && input.address() == address)
            .ok_or(TransactionError::UnknownPublicKey)?;
        state.slots[position] = Some(InputSignature::new(
            Rcd::from_public_key(public_key),
            signature,
        ));
        Ok(self)
    }

    /// Supply the externally produced issuer signature for the coinbase
    /// slot; `key` must byte-equal the `id1` declared in the first pass.
    pub fn id1_signature(
        mut self,
        key: &IssuerPublicKey,
        signature: Signature,
    ) -> TransactionResult<Self> {
        let state = self.awaiting()?;
        let position = state
            .tx
            .inputs()
            .iter()
            .position(Input::is_coinbase)
            .ok_or(TransactionError::UnknownPublicKey)?;
        if state.tx.declared_issuer() != Some(key) {
            return Err(TransactionError::Id1Mismatch);
        }
        let verifying_key = key
            .verifying_key()
            .map_err(|_| TransactionError::InvalidIssuerKey)?;
        state.slots[position] = Some(InputSignature::new(
            Rcd::from_public_key(&verifying_key),
            signature,
        ));
        Ok(self)
    }

    /// Validate and freeze the transaction.
    ///
    /// With private keys in hand this signs every slot and returns a signed
    /// transaction; with external-signing inputs it returns the unsigned
    /// first-pass transaction; seeded with one, it requires every slot
    /// filled and returns the signed transaction.
    pub fn build(self) -> TransactionResult<Transaction<A>> {
        match self.state {
            State::Assembling(state) => state.build(),
            State::AwaitingSignatures(state) => state.build(),
        }
    }

    fn assembling(&mut self) -> TransactionResult<&mut Assembling<A>> {
        match &mut self.state {
            State::Assembling(state) => Ok(state),
            State::AwaitingSignatures(_) => Err(TransactionError::BuilderFinalized),
        }
    }

    fn awaiting(&mut self) -> TransactionResult<&mut AwaitingSignatures<A>> {
        match &mut self.state {
            State::AwaitingSignatures(state) => Ok(state),
            State::Assembling(_) => Err(TransactionError::BuilderFinalized),
        }
    }
}

impl Fat1Builder {
    /// Attach per-range token metadata to freshly minted ids. Only valid on
    /// a coinbase builder; checked again at `build`.
    pub fn token_metadata(
        mut self,
        entries: Vec<NFTokenMetadataEntry>,
    ) -> TransactionResult<Self> {
        let state = self.assembling()?;
        if !state.inputs.iter().any(Input::is_coinbase) {
            return Err(TransactionError::TokenMetadataNotCoinbase);
        }
        state.token_metadata = Some(entries);
        Ok(self)
    }
}

impl<A: TokenAmount> Assembling<A> {
    fn push_input(&mut self, input: Input<A>, signer: SlotSigner) -> TransactionResult<()> {
        if self.inputs.iter().any(Input::is_coinbase) {
            return Err(TransactionError::CoinbaseWithExtraInputs);
        }
        let address = input.address();
        if self.outputs.iter().any(|output| output.address() == address) {
            return Err(TransactionError::AddressAppearsOnBothSides);
        }
        self.inputs.push(input);
        self.signers.push(signer);
        Ok(())
    }

    fn push_output(&mut self, output: Output<A>) -> TransactionResult<()> {
        let address = output.address();
        if self.inputs.iter().any(|input| input.address() == address) {
            return Err(TransactionError::AddressAppearsOnBothSides);
        }
        self.outputs.push(output);
        Ok(())
    }

    fn build(self) -> TransactionResult<Transaction<A>> {
        let is_coinbase = self.inputs.iter().any(Input::is_coinbase);
        if is_coinbase {
            match (&self.issuer_secret, &self.issuer_public) {
                (None, None) => return Err(TransactionError::MissingIssuerKey),
                (Some(_), Some(_)) => return Err(TransactionError::InvalidIssuerKey),
                _ => {}
            }
        }

        // External intent: any externally signed input, or a coinbase whose
        // issuer declared only the public id1. Keyed and external inputs do
        // not mix; the first pass must be wholly one or the other.
        let external = self
            .signers
            .iter()
            .any(|signer| matches!(signer, SlotSigner::External))
            || (is_coinbase && self.issuer_public.is_some());
        if external
            && self
                .signers
                .iter()
                .any(|signer| matches!(signer, SlotSigner::Key(_)))
        {
            return Err(TransactionError::InvalidAddress(AddressRole::Input));
        }

        let timestamp = self.timestamp.unwrap_or_else(unix_now);
        let declared_issuer = if external { self.issuer_public } else { None };
        let input_count = self.inputs.len();
        let output_count = self.outputs.len();

        let tx = Transaction::unsigned(TransactionParams {
            chain_id: self.chain_id,
            timestamp,
            inputs: self.inputs,
            outputs: self.outputs,
            metadata: self.metadata,
            token_metadata: self.token_metadata,
            declared_issuer,
        })?;

        if external {
            debug!(
                chain_id = %self.chain_id,
                inputs = input_count,
                outputs = output_count,
                "built unsigned transaction for external signing"
            );
            return Ok(tx);
        }

        let mut signatures = Vec::with_capacity(input_count);
        for (position, signer) in self.signers.iter().enumerate() {
            let key = match signer {
                SlotSigner::Key(key) => key.as_ref().clone(),
                SlotSigner::Issuer => match &self.issuer_secret {
                    Some(secret) => secret.signing_key(),
                    None => return Err(TransactionError::MissingIssuerKey),
                },
                SlotSigner::External => return Err(TransactionError::MissingSignature(position)),
            };
            signatures.push(InputSignature::sign(
                &key,
                position,
                timestamp,
                &self.chain_id,
                tx.content(),
            ));
        }
        let tx = tx.into_signed(signatures)?;

        debug!(
            chain_id = %self.chain_id,
            inputs = input_count,
            outputs = output_count,
            coinbase = is_coinbase,
            "built signed transaction"
        );
        Ok(tx)
    }
}

impl<A: TokenAmount> AwaitingSignatures<A> {
    fn build(self) -> TransactionResult<Transaction<A>> {
        if let Some(position) = self.slots.iter().position(Option::is_none) {
            return Err(TransactionError::MissingSignature(position));
        }
        let signatures = self.slots.into_iter().flatten().collect();
        let tx = self.tx.into_signed(signatures)?;
        debug!(
            chain_id = %tx.chain_id(),
            inputs = tx.inputs().len(),
            "filled external signatures"
        );
        Ok(tx)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
