// Copyright (c) 2019-2024 The FAT Developers

//! The immutable issuance record.
//!
//! An issuance is the first application entry on a token's chain: it names
//! the standard, the supply and an optional display symbol, and is signed
//! solely by the issuer's identity key. The signing scheme is the same
//! per-slot scheme transactions use, with the issuance occupying slot 0.

use crate::{IssuanceError, IssuanceResult};
use core::fmt;
use core::str::FromStr;
use ed25519_dalek::{Signature, Signer};
use fat_addressing::{IssuerSecretKey, Rcd};
use fat_transaction_core::{signing_digest, ChainId, Entry, InputSignature};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// The token standard an issuance declares.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenType {
    /// Fungible tokens with integer amounts.
    Fat0,
    /// Non-fungible tokens with id-set amounts.
    Fat1,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fat0 => "FAT-0",
            Self::Fat1 => "FAT-1",
        })
    }
}

impl FromStr for TokenType {
    type Err = IssuanceError;

    fn from_str(s: &str) -> IssuanceResult<Self> {
        match s {
            "FAT-0" => Ok(Self::Fat0),
            "FAT-1" => Ok(Self::Fat1),
            other => Err(IssuanceError::UnknownTokenType(other.into())),
        }
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Sentinel supply meaning "unlimited".
pub const UNLIMITED_SUPPLY: i64 = -1;

/// An immutable, issuer-signed issuance record.
#[derive(Clone, Debug, PartialEq)]
pub struct Issuance {
    token_id: String,
    issuer_chain_id: ChainId,
    chain_id: ChainId,
    token_type: TokenType,
    supply: i64,
    symbol: Option<String>,
    metadata: Option<Value>,
    timestamp: u64,
    content: Vec<u8>,
    signature: InputSignature,
}

impl Issuance {
    /// The declared token standard.
    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// The issuer-chosen token id.
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// The issuer's root chain.
    pub fn issuer_chain_id(&self) -> &ChainId {
        &self.issuer_chain_id
    }

    /// The token chain this issuance lives on, derived from the token id
    /// and issuer chain.
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Maximum supply; [`UNLIMITED_SUPPLY`] when unbounded.
    pub fn supply(&self) -> i64 {
        self.supply
    }

    /// Display symbol, if declared.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Free-form metadata, if declared.
    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Unix seconds at which the issuance was signed.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// The exact content bytes the issuer signed.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The canonical entry projection for submission.
    pub fn entry(&self) -> Entry {
        Entry::new(
            self.chain_id,
            vec![
                self.timestamp.to_string().into_bytes(),
                self.signature.rcd().as_bytes().to_vec(),
                self.signature.signature().to_bytes().to_vec(),
            ],
            self.content.clone(),
        )
    }

    /// The entry hash of the canonical entry.
    pub fn entry_hash(&self) -> [u8; 32] {
        self.entry().hash()
    }

    /// Parse an issuance entry into an accessor bag.
    ///
    /// The entry's chain id must match the one derived from `token_id` and
    /// `issuer_chain_id`, and its ext-ids must be exactly the timestamp,
    /// issuer RCD and signature.
    pub fn from_entry(
        entry: &Entry,
        token_id: &str,
        issuer_chain_id: ChainId,
    ) -> IssuanceResult<Self> {
        let expected = ChainId::for_token(token_id, &issuer_chain_id);
        if *entry.chain_id() != expected {
            return Err(IssuanceError::ChainIdMismatch {
                expected,
                found: *entry.chain_id(),
            });
        }

        let ext_ids = entry.ext_ids();
        if ext_ids.len() != 3 {
            return Err(IssuanceError::MalformedEntry(
                "ext-ids must be timestamp, rcd and signature".into(),
            ));
        }
        let timestamp: u64 = core::str::from_utf8(&ext_ids[0])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                IssuanceError::MalformedEntry("timestamp ext-id is not decimal ascii".into())
            })?;
        let rcd = Rcd::try_from(ext_ids[1].as_slice())
            .map_err(|err| IssuanceError::MalformedEntry(format!("rcd: {err}")))?;
        let bytes: &[u8; 64] = ext_ids[2]
            .as_slice()
            .try_into()
            .map_err(|_| IssuanceError::MalformedEntry("signature must be 64 bytes".into()))?;
        let signature = InputSignature::new(rcd, Signature::from_bytes(bytes));

        let fields = parse_content(entry.content())?;

        Ok(Self {
            token_id: token_id.into(),
            issuer_chain_id,
            chain_id: expected,
            token_type: fields.token_type,
            supply: fields.supply,
            symbol: fields.symbol,
            metadata: fields.metadata,
            timestamp,
            content: entry.content().to_vec(),
            signature,
        })
    }
}

struct ContentFields {
    token_type: TokenType,
    supply: i64,
    symbol: Option<String>,
    metadata: Option<Value>,
}

fn parse_content(content: &[u8]) -> IssuanceResult<ContentFields> {
    let root: Value = serde_json::from_slice(content)
        .map_err(|err| IssuanceError::MalformedEntry(format!("content: {err}")))?;
    let Value::Object(root) = root else {
        return Err(IssuanceError::MalformedEntry(
            "content must be a json object".into(),
        ));
    };

    let mut token_type = None;
    let mut supply = None;
    let mut symbol = None;
    let mut metadata = None;
    for (key, value) in root {
        match key.as_str() {
            "type" => {
                let s = value.as_str().ok_or_else(|| {
                    IssuanceError::MalformedEntry("`type` must be a string".into())
                })?;
                token_type = Some(s.parse()?);
            }
            "supply" => {
                let n = value.as_i64().ok_or_else(|| {
                    IssuanceError::MalformedEntry("`supply` must be an integer".into())
                })?;
                supply = Some(validate_supply(n)?);
            }
            "symbol" => {
                let s = value.as_str().ok_or_else(|| {
                    IssuanceError::MalformedEntry("`symbol` must be a string".into())
                })?;
                symbol = Some(s.to_owned());
            }
            "metadata" => metadata = Some(value),
            other => {
                return Err(IssuanceError::MalformedEntry(format!(
                    "unknown content key `{other}`"
                )))
            }
        }
    }

    Ok(ContentFields {
        token_type: token_type
            .ok_or_else(|| IssuanceError::MalformedEntry("content is missing `type`".into()))?,
        supply: supply.ok_or(IssuanceError::MissingSupply)?,
        symbol,
        metadata,
    })
}

fn validate_supply(supply: i64) -> IssuanceResult<i64> {
    if supply > 0 || supply == UNLIMITED_SUPPLY {
        Ok(supply)
    } else {
        Err(IssuanceError::InvalidSupply(supply))
    }
}

/// Fluent builder for issuer-signed issuances.
pub struct IssuanceBuilder {
    token_type: TokenType,
    token_id: String,
    issuer_chain_id: ChainId,
    supply: Option<i64>,
    symbol: Option<String>,
    metadata: Option<Value>,
    issuer_secret: Option<IssuerSecretKey>,
    timestamp: Option<u64>,
}

impl IssuanceBuilder {
    /// Start an issuance of `token_type` for `token_id` under the issuer's
    /// root chain.
    pub fn new(
        token_type: TokenType,
        token_id: impl Into<String>,
        issuer_chain_id: ChainId,
    ) -> Self {
        Self {
            token_type,
            token_id: token_id.into(),
            issuer_chain_id,
            supply: None,
            symbol: None,
            metadata: None,
            issuer_secret: None,
            timestamp: None,
        }
    }

    /// Declare the maximum supply: a positive integer, or
    /// [`UNLIMITED_SUPPLY`].
    pub fn supply(mut self, supply: i64) -> IssuanceResult<Self> {
        self.supply = Some(validate_supply(supply)?);
        Ok(self)
    }

    /// Declare a display symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Attach free-form metadata to the issuance content.
    pub fn metadata<M: Serialize>(mut self, metadata: M) -> IssuanceResult<Self> {
        self.metadata =
            Some(serde_json::to_value(metadata).map_err(|_| IssuanceError::MetadataNotSerializable)?);
        Ok(self)
    }

    /// Declare the issuer secret key that signs the issuance.
    pub fn sk1(mut self, key: IssuerSecretKey) -> Self {
        self.issuer_secret = Some(key);
        self
    }

    /// Pin the signing timestamp (Unix seconds) instead of sampling the
    /// clock at `build`.
    pub fn timestamp(mut self, unix_seconds: u64) -> Self {
        self.timestamp = Some(unix_seconds);
        self
    }

    /// Validate, sign and freeze the issuance.
    pub fn build(self) -> IssuanceResult<Issuance> {
        let supply = self.supply.ok_or(IssuanceError::MissingSupply)?;
        let secret = self.issuer_secret.ok_or(IssuanceError::MissingIssuerKey)?;

        let mut root = Map::new();
        root.insert("type".into(), Value::String(self.token_type.to_string()));
        root.insert("supply".into(), Value::from(supply));
        if let Some(symbol) = &self.symbol {
            root.insert("symbol".into(), Value::String(symbol.clone()));
        }
        if let Some(metadata) = &self.metadata {
            root.insert("metadata".into(), metadata.clone());
        }
        let content = serde_json::to_vec(&Value::Object(root))
            .map_err(|_| IssuanceError::MetadataNotSerializable)?;

        let chain_id = ChainId::for_token(&self.token_id, &self.issuer_chain_id);
        let timestamp = self.timestamp.unwrap_or_else(unix_now);
        let key = secret.signing_key();
        let digest = signing_digest(0, timestamp, &chain_id, &content);
        let signature = InputSignature::new(
            Rcd::from_public_key(&key.verifying_key()),
            key.sign(&digest),
        );

        debug!(
            chain_id = %chain_id,
            token_type = %self.token_type,
            supply,
            "built issuance"
        );

        Ok(Issuance {
            token_id: self.token_id,
            issuer_chain_id: self.issuer_chain_id,
            chain_id,
            token_type: self.token_type,
            supply,
            symbol: self.symbol,
            metadata: self.metadata,
            timestamp,
            content,
            signature,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
