// Copyright (c) 2019-2024 The FAT Developers

//! Base58check rendering shared by every key kind.
//!
//! A rendered key is `base58(prefix || payload || checksum)` where the
//! checksum is the first four bytes of SHA-256d over `prefix || payload`.

use crate::{AddressKeyError, Result};
use sha2::{Digest, Sha256};

/// Checksum length in bytes.
const CHECKSUM_LENGTH: usize = 4;

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&second[..CHECKSUM_LENGTH]);
    out
}

/// Render `prefix || payload` with its checksum appended.
pub(crate) fn encode(prefix: &[u8], payload: &[u8]) -> String {
    let mut body = Vec::with_capacity(prefix.len() + payload.len() + CHECKSUM_LENGTH);
    body.extend_from_slice(prefix);
    body.extend_from_slice(payload);
    let check = checksum(&body);
    body.extend_from_slice(&check);
    bs58::encode(body).into_string()
}

/// Decode a rendered key, validating prefix, payload length and checksum.
///
/// Returns the raw payload bytes.
pub(crate) fn decode(s: &str, prefix: &[u8], payload_len: usize) -> Result<Vec<u8>> {
    let raw = bs58::decode(s)
        .into_vec()
        .map_err(|_| AddressKeyError::Base58)?;

    let expected_len = prefix.len() + payload_len + CHECKSUM_LENGTH;
    if raw.len() != expected_len {
        return Err(AddressKeyError::LengthMismatch {
            expected: payload_len,
            found: raw.len().saturating_sub(prefix.len() + CHECKSUM_LENGTH),
        });
    }
    if &raw[..prefix.len()] != prefix {
        return Err(AddressKeyError::WrongPrefix);
    }

    let (body, check) = raw.split_at(expected_len - CHECKSUM_LENGTH);
    if checksum(body) != check {
        return Err(AddressKeyError::InvalidChecksum);
    }

    Ok(body[prefix.len()..].to_vec())
}
