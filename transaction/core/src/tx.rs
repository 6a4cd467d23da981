// Copyright (c) 2019-2024 The FAT Developers

//! The immutable transaction record.
//!
//! A transaction is assembled by a builder, validated and frozen at
//! construction, and thereafter admits only read operations. Its canonical
//! wire form is an [`Entry`]: the content payload is the compact JSON
//! rendering of the inputs, outputs and optional metadata with keys in
//! builder insertion order, and the ext-id list carries the timestamp
//! followed by one RCD/signature pair per input, in input order.

use crate::validation;
use crate::{
    signing, ChainId, Entry, InputSignature, NFTokenIds, NFTokenMetadataEntry, TokenAmount,
    TransactionError, TransactionResult,
};
use ed25519_dalek::Signature;
use fat_addressing::{IssuerPublicKey, PublicAddress, Rcd};
use serde_json::{Map, Value};

/// A transaction input: an amount spent from an address, or minted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input<A> {
    /// Spend `amount` from `address`.
    Address {
        /// The spending address.
        address: PublicAddress,
        /// The amount spent.
        amount: A,
    },
    /// Mint `amount`; rendered as the coinbase sentinel address.
    Coinbase {
        /// The amount minted.
        amount: A,
    },
}

impl<A> Input<A> {
    /// The address this input is keyed by in the content map.
    pub fn address(&self) -> PublicAddress {
        match self {
            Self::Address { address, .. } => *address,
            Self::Coinbase { .. } => PublicAddress::coinbase(),
        }
    }

    /// The amount spent or minted.
    pub fn amount(&self) -> &A {
        match self {
            Self::Address { amount, .. } | Self::Coinbase { amount } => amount,
        }
    }

    /// Whether this is the minting input.
    pub fn is_coinbase(&self) -> bool {
        matches!(self, Self::Coinbase { .. })
    }
}

/// A transaction output: an amount paid to an address, or burned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Output<A> {
    /// Pay `amount` to `address`.
    Address {
        /// The receiving address.
        address: PublicAddress,
        /// The amount received.
        amount: A,
    },
    /// Destroy `amount`; rendered as the coinbase sentinel address.
    Burn {
        /// The amount burned.
        amount: A,
    },
}

impl<A> Output<A> {
    /// The address this output is keyed by in the content map.
    pub fn address(&self) -> PublicAddress {
        match self {
            Self::Address { address, .. } => *address,
            Self::Burn { .. } => PublicAddress::coinbase(),
        }
    }

    /// The amount received or burned.
    pub fn amount(&self) -> &A {
        match self {
            Self::Address { amount, .. } | Self::Burn { amount } => amount,
        }
    }

    /// Whether this is the burning output.
    pub fn is_burn(&self) -> bool {
        matches!(self, Self::Burn { .. })
    }
}

/// Everything a builder hands over to construct a transaction.
#[derive(Clone, Debug)]
pub struct TransactionParams<A> {
    /// The token chain the transaction commits to.
    pub chain_id: ChainId,
    /// Unix seconds, fixed at signing time.
    pub timestamp: u64,
    /// Inputs in builder insertion order; the order fixes slot assignment.
    pub inputs: Vec<Input<A>>,
    /// Outputs in builder insertion order.
    pub outputs: Vec<Output<A>>,
    /// Optional free-form metadata.
    pub metadata: Option<Value>,
    /// Optional per-range token metadata (FAT-1 coinbase only).
    pub token_metadata: Option<Vec<NFTokenMetadataEntry>>,
    /// Issuer key declared for external coinbase signing, if any.
    pub declared_issuer: Option<IssuerPublicKey>,
}

/// An immutable FAT transaction, fungible or non-fungible by `A`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction<A: TokenAmount> {
    chain_id: ChainId,
    timestamp: u64,
    inputs: Vec<Input<A>>,
    outputs: Vec<Output<A>>,
    metadata: Option<Value>,
    token_metadata: Option<Vec<NFTokenMetadataEntry>>,
    content: Vec<u8>,
    slots: Vec<Option<InputSignature>>,
    declared_issuer: Option<IssuerPublicKey>,
}

/// A fungible (FAT-0) transaction.
pub type Fat0Transaction = Transaction<u64>;

/// A non-fungible (FAT-1) transaction.
pub type Fat1Transaction = Transaction<NFTokenIds>;

impl<A: TokenAmount> Transaction<A> {
    /// Validate `params` and freeze an unsigned transaction with every
    /// signature slot reserved but empty.
    pub fn unsigned(params: TransactionParams<A>) -> TransactionResult<Self> {
        validation::validate_structure(
            &params.inputs,
            &params.outputs,
            params.token_metadata.as_deref(),
        )?;
        let content = encode_content(
            &params.inputs,
            &params.outputs,
            params.metadata.as_ref(),
            params.token_metadata.as_deref(),
        )?;
        let slots = vec![None; params.inputs.len()];
        Ok(Self {
            chain_id: params.chain_id,
            timestamp: params.timestamp,
            inputs: params.inputs,
            outputs: params.outputs,
            metadata: params.metadata,
            token_metadata: params.token_metadata,
            content,
            slots,
            declared_issuer: params.declared_issuer,
        })
    }

    /// Fill every signature slot, consuming the unsigned value.
    ///
    /// `signatures` must hold exactly one entry per input, in input order.
    pub fn into_signed(mut self, signatures: Vec<InputSignature>) -> TransactionResult<Self> {
        if signatures.len() != self.inputs.len() {
            return Err(TransactionError::MissingSignature(signatures.len()));
        }
        self.slots = signatures.into_iter().map(Some).collect();
        self.declared_issuer = None;
        Ok(self)
    }

    /// The token chain this transaction commits to.
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Unix seconds at which the transaction was signed.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Inputs in slot order.
    pub fn inputs(&self) -> &[Input<A>] {
        &self.inputs
    }

    /// Outputs in insertion order.
    pub fn outputs(&self) -> &[Output<A>] {
        &self.outputs
    }

    /// Free-form metadata, if any.
    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Per-range token metadata, if any (FAT-1 coinbase only).
    pub fn token_metadata(&self) -> Option<&[NFTokenMetadataEntry]> {
        self.token_metadata.as_deref()
    }

    /// The exact content bytes committed to by every signature.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The signature slots, one per input.
    pub fn signature_slots(&self) -> &[Option<InputSignature>] {
        &self.slots
    }

    /// Issuer key declared for external coinbase signing, if any. Cleared
    /// once the transaction is signed.
    pub fn declared_issuer(&self) -> Option<&IssuerPublicKey> {
        self.declared_issuer.as_ref()
    }

    /// Whether every signature slot is filled.
    pub fn is_signed(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Whether this transaction mints tokens.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.iter().any(Input::is_coinbase)
    }

    /// The pre-hash signing preimage for slot `position`.
    pub fn marshal_data_sig(&self, position: usize) -> TransactionResult<Vec<u8>> {
        if position >= self.inputs.len() {
            return Err(TransactionError::MissingSignature(position));
        }
        Ok(signing::signing_preimage(
            position,
            self.timestamp,
            &self.chain_id,
            &self.content,
        ))
    }

    /// The ext-id list: timestamp, then one RCD/signature pair per input.
    pub fn ext_ids(&self) -> TransactionResult<Vec<Vec<u8>>> {
        let mut out = Vec::with_capacity(1 + 2 * self.slots.len());
        out.push(self.timestamp.to_string().into_bytes());
        for (position, slot) in self.slots.iter().enumerate() {
            let signature = slot
                .as_ref()
                .ok_or(TransactionError::MissingSignature(position))?;
            out.push(signature.rcd().as_bytes().to_vec());
            out.push(signature.signature().to_bytes().to_vec());
        }
        Ok(out)
    }

    /// The canonical entry projection for submission.
    pub fn entry(&self) -> TransactionResult<Entry> {
        Ok(Entry::new(
            self.chain_id,
            self.ext_ids()?,
            self.content.clone(),
        ))
    }

    /// The entry hash of the canonical entry.
    pub fn entry_hash(&self) -> TransactionResult<[u8; 32]> {
        Ok(self.entry()?.hash())
    }

    /// Recompute every slot digest and verify the stored signatures.
    ///
    /// Returns `false` on any Ed25519 mismatch or on an RCD that does not
    /// hash to its input's address; empty slots and undecodable key bytes
    /// are structural errors.
    pub fn validate_signatures(&self) -> TransactionResult<bool> {
        for (position, (input, slot)) in self.inputs.iter().zip(&self.slots).enumerate() {
            let signature = slot
                .as_ref()
                .ok_or(TransactionError::MissingSignature(position))?;
            // A coinbase slot is signed by the issuer identity, whose RCD
            // does not hash to the sentinel address.
            if !input.is_coinbase() && signature.rcd().hash() != *input.address().rcd_hash() {
                return Ok(false);
            }
            if !signature.verify(position, self.timestamp, &self.chain_id, &self.content)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Re-parse a canonical entry into a validated transaction.
    ///
    /// The entry must round-trip exactly: re-encoding the parsed fields has
    /// to reproduce the content bytes, and the ext-id list must carry a
    /// timestamp followed by whole RCD/signature pairs, one per input.
    pub fn from_entry(entry: &Entry) -> TransactionResult<Self> {
        let ext_ids = entry.ext_ids();
        if ext_ids.is_empty() || ext_ids.len() % 2 == 0 {
            return Err(TransactionError::MalformedEntry(
                "ext-ids must be a timestamp followed by rcd/signature pairs".into(),
            ));
        }

        let timestamp: u64 = core::str::from_utf8(&ext_ids[0])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                TransactionError::MalformedEntry("timestamp ext-id is not decimal ascii".into())
            })?;

        let mut signatures = Vec::with_capacity(ext_ids.len() / 2);
        for (position, pair) in ext_ids[1..].chunks_exact(2).enumerate() {
            let rcd = Rcd::try_from(pair[0].as_slice()).map_err(|err| {
                TransactionError::MalformedEntry(format!("slot {position}: {err}"))
            })?;
            let bytes: &[u8; 64] = pair[1].as_slice().try_into().map_err(|_| {
                TransactionError::MalformedEntry(format!(
                    "slot {position}: signature must be 64 bytes"
                ))
            })?;
            signatures.push(InputSignature::new(rcd, Signature::from_bytes(bytes)));
        }

        let params = parse_content(*entry.chain_id(), timestamp, entry.content())?;
        if params.inputs.len() != signatures.len() {
            return Err(TransactionError::MalformedEntry(
                "one rcd/signature pair is required per input".into(),
            ));
        }

        let tx = Self::unsigned(params)?.into_signed(signatures)?;
        if tx.content() != entry.content() {
            return Err(TransactionError::MalformedEntry(
                "content is not in canonical form".into(),
            ));
        }
        Ok(tx)
    }
}

/// Encode the canonical content object: `inputs`, `outputs`, then optional
/// `metadata` and `tokenmetadata`, compactly, in insertion order.
fn encode_content<A: TokenAmount>(
    inputs: &[Input<A>],
    outputs: &[Output<A>],
    metadata: Option<&Value>,
    token_metadata: Option<&[NFTokenMetadataEntry]>,
) -> TransactionResult<Vec<u8>> {
    let mut root = Map::new();
    root.insert(
        "inputs".into(),
        amounts_object(inputs.iter().map(|input| (input.address(), input.amount())))?,
    );
    root.insert(
        "outputs".into(),
        amounts_object(
            outputs
                .iter()
                .map(|output| (output.address(), output.amount())),
        )?,
    );
    if let Some(metadata) = metadata {
        root.insert("metadata".into(), metadata.clone());
    }
    if let Some(entries) = token_metadata {
        let value = serde_json::to_value(entries)
            .map_err(|_| TransactionError::MetadataNotSerializable)?;
        root.insert("tokenmetadata".into(), value);
    }
    serde_json::to_vec(&Value::Object(root)).map_err(|_| TransactionError::MetadataNotSerializable)
}

fn amounts_object<'a, A: TokenAmount + 'a>(
    entries: impl Iterator<Item = (PublicAddress, &'a A)>,
) -> TransactionResult<Value> {
    let mut map = Map::new();
    for (address, amount) in entries {
        let value =
            serde_json::to_value(amount).map_err(|_| TransactionError::MetadataNotSerializable)?;
        map.insert(address.to_string(), value);
    }
    Ok(Value::Object(map))
}

/// Parse canonical content bytes back into transaction parameters.
fn parse_content<A: TokenAmount>(
    chain_id: ChainId,
    timestamp: u64,
    content: &[u8],
) -> TransactionResult<TransactionParams<A>> {
    let root: Value = serde_json::from_slice(content)
        .map_err(|err| TransactionError::MalformedEntry(format!("content: {err}")))?;
    let Value::Object(root) = root else {
        return Err(TransactionError::MalformedEntry(
            "content must be a json object".into(),
        ));
    };

    let mut inputs = None;
    let mut outputs = None;
    let mut metadata = None;
    let mut token_metadata = None;
    for (key, value) in root {
        match key.as_str() {
            "inputs" => {
                inputs = Some(parse_side(&value, |address, amount| match address {
                    Some(address) => Input::Address { address, amount },
                    None => Input::Coinbase { amount },
                })?)
            }
            "outputs" => {
                outputs = Some(parse_side(&value, |address, amount| match address {
                    Some(address) => Output::Address { address, amount },
                    None => Output::Burn { amount },
                })?)
            }
            "metadata" => metadata = Some(value),
            "tokenmetadata" => {
                token_metadata =
                    Some(serde_json::from_value(value).map_err(|err| {
                        TransactionError::MalformedEntry(format!("tokenmetadata: {err}"))
                    })?)
            }
            other => {
                return Err(TransactionError::MalformedEntry(format!(
                    "unknown content key `{other}`"
                )))
            }
        }
    }

    Ok(TransactionParams {
        chain_id,
        timestamp,
        inputs: inputs.ok_or_else(|| {
            TransactionError::MalformedEntry("content is missing `inputs`".into())
        })?,
        outputs: outputs.ok_or_else(|| {
            TransactionError::MalformedEntry("content is missing `outputs`".into())
        })?,
        metadata,
        token_metadata,
        declared_issuer: None,
    })
}

/// Parse one side of the content object, mapping the coinbase sentinel to
/// `None` so the caller can pick the dedicated variant.
fn parse_side<A: TokenAmount, T>(
    value: &Value,
    build: impl Fn(Option<PublicAddress>, A) -> T,
) -> TransactionResult<Vec<T>> {
    let Value::Object(map) = value else {
        return Err(TransactionError::MalformedEntry(
            "inputs and outputs must be json objects".into(),
        ));
    };
    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        let address: PublicAddress = key.parse().map_err(|_| {
            TransactionError::MalformedEntry(format!("`{key}` is not a public address"))
        })?;
        let amount: A = serde_json::from_value(value.clone())
            .map_err(|err| TransactionError::MalformedEntry(format!("amount: {err}")))?;
        let address = (!address.is_coinbase()).then_some(address);
        out.push(build(address, amount));
    }
    Ok(out)
}
