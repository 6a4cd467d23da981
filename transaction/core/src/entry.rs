// Copyright (c) 2019-2024 The FAT Developers

//! The ledger's atomic record.
//!
//! An entry is a chain id, a list of ext-ids and a content payload. The
//! binary marshaling and the entry hash are fixed by the underlying ledger;
//! transactions and issuances project into this form for submission.

use crate::ChainId;
use sha2::{Digest, Sha256, Sha512};

/// A ledger entry: chain id, ext-id list and content payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    chain_id: ChainId,
    ext_ids: Vec<Vec<u8>>,
    content: Vec<u8>,
}

impl Entry {
    /// Assemble an entry.
    pub fn new(chain_id: ChainId, ext_ids: Vec<Vec<u8>>, content: Vec<u8>) -> Self {
        Self {
            chain_id,
            ext_ids,
            content,
        }
    }

    /// The chain this entry commits to.
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// The ext-id list.
    pub fn ext_ids(&self) -> &[Vec<u8>] {
        &self.ext_ids
    }

    /// The content payload.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The ledger's binary marshaling: version byte, chain id, big-endian
    /// u16 ext-id section size, length-prefixed ext-ids, then content.
    ///
    /// The ledger caps entries far below u16-sized ext-ids, so the length
    /// casts are total for every representable entry.
    pub fn marshal_binary(&self) -> Vec<u8> {
        let ext_id_section: usize = self.ext_ids.iter().map(|e| 2 + e.len()).sum();
        let mut out = Vec::with_capacity(1 + 32 + 2 + ext_id_section + self.content.len());
        out.push(0x00);
        out.extend_from_slice(self.chain_id.as_bytes());
        out.extend_from_slice(&(ext_id_section as u16).to_be_bytes());
        for ext_id in &self.ext_ids {
            out.extend_from_slice(&(ext_id.len() as u16).to_be_bytes());
            out.extend_from_slice(ext_id);
        }
        out.extend_from_slice(&self.content);
        out
    }

    /// The entry hash: `SHA-256( SHA-512(marshaled) || marshaled )`.
    pub fn hash(&self) -> [u8; 32] {
        let marshaled = self.marshal_binary();
        let mut hasher = Sha256::new();
        hasher.update(Sha512::digest(&marshaled));
        hasher.update(&marshaled);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ChainId {
        "013de826902b7d075f00101649ca4fa7b49b5157cba736b2ca90f67e2ad6e8ec"
            .parse()
            .unwrap()
    }

    #[test]
    fn marshal_layout() {
        let entry = Entry::new(chain(), vec![b"ab".to_vec(), b"c".to_vec()], b"xyz".to_vec());
        let marshaled = entry.marshal_binary();
        assert_eq!(marshaled[0], 0x00);
        assert_eq!(&marshaled[1..33], chain().as_bytes());
        // Section size: (2 + 2) + (2 + 1) = 7.
        assert_eq!(&marshaled[33..35], &[0x00, 0x07]);
        assert_eq!(&marshaled[35..37], &[0x00, 0x02]);
        assert_eq!(&marshaled[37..39], b"ab");
        assert_eq!(&marshaled[39..41], &[0x00, 0x01]);
        assert_eq!(&marshaled[41..42], b"c");
        assert_eq!(&marshaled[42..], b"xyz");
    }

    #[test]
    fn hash_is_stable() {
        let entry = Entry::new(chain(), vec![b"1550612392".to_vec()], b"{}".to_vec());
        assert_eq!(entry.hash(), entry.hash());
        let different = Entry::new(chain(), vec![b"1550612393".to_vec()], b"{}".to_vec());
        assert_ne!(entry.hash(), different.hash());
    }
}
