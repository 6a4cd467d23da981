// Copyright (c) 2019-2024 The FAT Developers

//! End-to-end build-then-verify scenarios for both token standards.

use fat_addressing::{IssuerSecretKey, PrivateAddress, PublicAddress, COINBASE_PUBLIC};
use fat_transaction_builder::{Fat0Builder, Fat1Builder};
use fat_transaction_core::{
    ChainId, Fat0Transaction, Fat1Transaction, IdSetError, NFTokenIdElement, NFTokenIds,
    NFTokenMetadataEntry, Transaction, TransactionError,
};
use serde_json::json;

const CHAIN: &str = "013de826902b7d075f00101649ca4fa7b49b5157cba736b2ca90f67e2ad6e8ec";
const FS_IN: &str = "Fs1PkAEbmo1XNangSnxmKqi1PN5sVDbQ6zsnXCsMUejT66WaDgkm";
const FA_OUT: &str = "FA3aECpw3gEZ7CMQvRNxEtKBGKAos3922oqYLcHQ9NqXHudC6YBM";
const SK1: &str = "sk13Rp3LVmVvWqo8mff82aDJN2yNCzjUs2Zuq3MNQSA5oC5ZwFAuu";
const TIMESTAMP: u64 = 1550612392;

fn chain() -> ChainId {
    CHAIN.parse().unwrap()
}

fn fs_in() -> PrivateAddress {
    FS_IN.parse().unwrap()
}

fn fa_out() -> PublicAddress {
    FA_OUT.parse().unwrap()
}

fn sk1() -> IssuerSecretKey {
    SK1.parse().unwrap()
}

fn ids(elements: Vec<NFTokenIdElement>) -> NFTokenIds {
    NFTokenIds::new(elements).unwrap()
}

fn range(min: u64, max: u64) -> NFTokenIdElement {
    NFTokenIdElement::Range { min, max }
}

#[test]
fn simple_fungible_transfer() {
    let tx = Fat0Builder::new(chain())
        .timestamp(TIMESTAMP)
        .unwrap()
        .input(&fs_in(), 150)
        .unwrap()
        .output(fa_out(), 150)
        .unwrap()
        .build()
        .unwrap();

    assert!(!tx.is_coinbase());
    assert_eq!(tx.validate_signatures(), Ok(true));

    let entry = tx.entry().unwrap();
    assert_eq!(entry.ext_ids().len(), 3);
    assert_eq!(entry.ext_ids()[0], TIMESTAMP.to_string().into_bytes());
    assert_eq!(
        std::str::from_utf8(entry.content()).unwrap(),
        "{\"inputs\":{\"FA2Qwmzp4xeXR4jWYrQnbPSXi5wLdVHy8p3ksAVSvyjLEX7jE3pN\":150},\
         \"outputs\":{\"FA3aECpw3gEZ7CMQvRNxEtKBGKAos3922oqYLcHQ9NqXHudC6YBM\":150}}"
    );
    // Pinned timestamp makes the signature and entry hash reproducible.
    assert_eq!(
        hex::encode(&entry.ext_ids()[2]),
        "3471a2b34b4f4d294f1b758d5ff2790ee2dd1eef698b3b76fc4adf6fdada3963\
         68c7535375e4ada82bb90b647d4a1a298ac91e5b841b46244af66a91a1508306"
    );
    assert_eq!(
        hex::encode(tx.entry_hash().unwrap()),
        "01e8095971f49e2112e893adbf427e863662b6ab6bb7a01bb897b5df43bd6f37"
    );
}

#[test]
fn fungible_coinbase_is_signed_by_the_issuer_identity() {
    let tx = Fat0Builder::new(chain())
        .timestamp(TIMESTAMP)
        .unwrap()
        .coinbase_input(10)
        .unwrap()
        .output(fa_out(), 10)
        .unwrap()
        .sk1(sk1())
        .unwrap()
        .build()
        .unwrap();

    assert!(tx.is_coinbase());
    assert_eq!(tx.validate_signatures(), Ok(true));

    let entry = tx.entry().unwrap();
    assert_eq!(entry.ext_ids().len(), 3);
    // The sole RCD commits to the identity key derived from the sk1.
    assert_eq!(
        hex::encode(&entry.ext_ids()[1][1..]),
        "598f8344980292747a8beabfa4510c7c5947ccd8e2cb07b815a38887bfb0192d"
    );
    // The content keys the input by the coinbase sentinel.
    assert!(std::str::from_utf8(entry.content())
        .unwrap()
        .contains(&format!("\"{COINBASE_PUBLIC}\":10")));
}

#[test]
fn non_fungible_range_transfer() {
    let amount = ids(vec![range(0, 3), 150.into()]);
    let tx = Fat1Builder::new(chain())
        .timestamp(TIMESTAMP)
        .unwrap()
        .input(&fs_in(), amount.clone())
        .unwrap()
        .output(fa_out(), amount)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(tx.validate_signatures(), Ok(true));
    assert_eq!(tx.inputs()[0].amount().expand(), vec![0, 1, 2, 3, 150]);
    assert_eq!(
        std::str::from_utf8(tx.content()).unwrap(),
        "{\"inputs\":{\"FA2Qwmzp4xeXR4jWYrQnbPSXi5wLdVHy8p3ksAVSvyjLEX7jE3pN\":[{\"min\":0,\"max\":3},150]},\
         \"outputs\":{\"FA3aECpw3gEZ7CMQvRNxEtKBGKAos3922oqYLcHQ9NqXHudC6YBM\":[{\"min\":0,\"max\":3},150]}}"
    );
}

#[test]
fn non_fungible_burn() {
    let amount = ids(vec![range(0, 3), 150.into()]);
    let tx = Fat1Builder::new(chain())
        .input(&fs_in(), amount.clone())
        .unwrap()
        .burn_output(amount)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(tx.outputs().len(), 1);
    assert!(tx.outputs()[0].is_burn());
    assert_eq!(tx.outputs()[0].address().to_string(), COINBASE_PUBLIC);
    assert_eq!(tx.validate_signatures(), Ok(true));
}

#[test]
fn multi_input_slot_assignment_follows_insertion_order() {
    let second = PrivateAddress::from_seed([42u8; 32]);
    let third = PublicAddress::from_rcd_hash([7u8; 32]);
    let tx = Fat0Builder::new(chain())
        .timestamp(TIMESTAMP)
        .unwrap()
        .input(&fs_in(), 100)
        .unwrap()
        .input(&second, 50)
        .unwrap()
        .output(fa_out(), 120)
        .unwrap()
        .output(third, 30)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(tx.validate_signatures(), Ok(true));
    let entry = tx.entry().unwrap();
    assert_eq!(entry.ext_ids().len(), 1 + 2 * tx.inputs().len());
    // Slot 0 belongs to the first inserted input.
    assert_eq!(
        entry.ext_ids()[1][1..],
        fs_in().signing_key().verifying_key().to_bytes()[..]
    );
    assert_eq!(
        entry.ext_ids()[3][1..],
        second.signing_key().verifying_key().to_bytes()[..]
    );
}

#[test]
fn unbalanced_sums_are_rejected() {
    let err = Fat0Builder::new(chain())
        .input(&fs_in(), 150)
        .unwrap()
        .output(fa_out(), 11)
        .unwrap()
        .build()
        .err();
    assert_eq!(err, Some(TransactionError::BalanceMismatch));
}

#[test]
fn overlapping_ranges_are_rejected() {
    assert_eq!(
        NFTokenIds::new(vec![range(0, 3), range(2, 4)]).err(),
        Some(IdSetError::Overlap)
    );

    // The same overlap across two inputs is caught at build.
    let second = PrivateAddress::from_seed([42u8; 32]);
    let err = Fat1Builder::new(chain())
        .input(&fs_in(), ids(vec![range(0, 3)]))
        .unwrap()
        .input(&second, ids(vec![range(2, 4)]))
        .unwrap()
        .output(fa_out(), ids(vec![range(0, 4)]))
        .unwrap()
        .build()
        .err();
    assert_eq!(
        err,
        Some(TransactionError::InvalidIdSet(IdSetError::Overlap))
    );
}

#[test]
fn second_coinbase_input_is_rejected() {
    let err = Fat0Builder::new(chain())
        .coinbase_input(10)
        .unwrap()
        .coinbase_input(10)
        .err();
    assert_eq!(err, Some(TransactionError::CoinbaseWithExtraInputs));

    let err = Fat0Builder::new(chain())
        .coinbase_input(10)
        .unwrap()
        .input(&fs_in(), 5)
        .err();
    assert_eq!(err, Some(TransactionError::CoinbaseWithExtraInputs));
}

#[test]
fn token_metadata_requires_a_coinbase_builder() {
    let records = vec![NFTokenMetadataEntry::new(
        ids(vec![range(0, 3)]),
        json!({"rarity": "common"}),
    )];
    let err = Fat1Builder::new(chain())
        .input(&fs_in(), ids(vec![range(0, 3)]))
        .unwrap()
        .token_metadata(records)
        .err();
    assert_eq!(err, Some(TransactionError::TokenMetadataNotCoinbase));
}

#[test]
fn coinbase_without_issuer_key_is_rejected() {
    let err = Fat0Builder::new(chain())
        .coinbase_input(10)
        .unwrap()
        .output(fa_out(), 10)
        .unwrap()
        .build()
        .err();
    assert_eq!(err, Some(TransactionError::MissingIssuerKey));
}

#[test]
fn address_cannot_appear_on_both_sides() {
    let err = Fat0Builder::new(chain())
        .input(&fs_in(), 150)
        .unwrap()
        .output(fs_in().public_address(), 150)
        .err();
    assert_eq!(err, Some(TransactionError::AddressAppearsOnBothSides));
}

#[test]
fn sentinel_is_rejected_as_an_ordinary_address() {
    let err = Fat0Builder::new(chain())
        .input(&fs_in(), 10)
        .unwrap()
        .output(PublicAddress::coinbase(), 10)
        .err();
    assert_eq!(
        err,
        Some(TransactionError::InvalidAddress(
            fat_transaction_core::AddressRole::Output
        ))
    );

    let err = Fat0Builder::new(chain())
        .input(&PrivateAddress::coinbase(), 10)
        .err();
    assert_eq!(
        err,
        Some(TransactionError::InvalidAddress(
            fat_transaction_core::AddressRole::Input
        ))
    );
}

#[test]
fn second_burn_output_is_rejected() {
    let err = Fat1Builder::new(chain())
        .input(&fs_in(), ids(vec![range(0, 3)]))
        .unwrap()
        .burn_output(ids(vec![range(0, 1)]))
        .unwrap()
        .burn_output(ids(vec![range(2, 3)]))
        .err();
    assert_eq!(err, Some(TransactionError::DuplicateBurnOutput));
}

#[test]
fn coinbase_mint_with_token_metadata_roundtrips() {
    let minted = ids(vec![range(0, 9)]);
    let tx = Fat1Builder::new(chain())
        .timestamp(TIMESTAMP)
        .unwrap()
        .coinbase_input(minted.clone())
        .unwrap()
        .output(fa_out(), minted)
        .unwrap()
        .token_metadata(vec![
            NFTokenMetadataEntry::new(ids(vec![range(0, 4)]), json!({"edition": 1})),
            NFTokenMetadataEntry::new(ids(vec![range(5, 9)]), json!({"edition": 2})),
        ])
        .unwrap()
        .sk1(sk1())
        .unwrap()
        .build()
        .unwrap();

    assert!(tx.is_coinbase());
    assert_eq!(tx.validate_signatures(), Ok(true));
    assert!(std::str::from_utf8(tx.content())
        .unwrap()
        .contains("\"tokenmetadata\":[{\"ids\":[{\"min\":0,\"max\":4}]"));

    let reparsed = Fat1Transaction::from_entry(&tx.entry().unwrap()).unwrap();
    assert_eq!(reparsed, tx);
    assert_eq!(reparsed.validate_signatures(), Ok(true));
}

#[test]
fn metadata_is_carried_and_roundtrips() {
    let tx = Fat0Builder::new(chain())
        .timestamp(TIMESTAMP)
        .unwrap()
        .input(&fs_in(), 150)
        .unwrap()
        .output(fa_out(), 150)
        .unwrap()
        .metadata(json!({"memo": "rent", "invoice": 42}))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(tx.metadata(), Some(&json!({"memo": "rent", "invoice": 42})));

    let reparsed = Fat0Transaction::from_entry(&tx.entry().unwrap()).unwrap();
    assert_eq!(reparsed, tx);
    assert_eq!(reparsed.validate_signatures(), tx.validate_signatures());
}

#[test]
fn builders_without_a_timestamp_pin_use_the_clock() {
    let before = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let tx = Fat0Builder::new(chain())
        .input(&fs_in(), 150)
        .unwrap()
        .output(fa_out(), 150)
        .unwrap()
        .build()
        .unwrap();
    assert!(tx.timestamp() >= before);
    assert_eq!(tx.validate_signatures(), Ok(true));
}

#[test]
fn balance_overflow_is_reported() {
    let second = PrivateAddress::from_seed([42u8; 32]);
    let err = Fat0Builder::new(chain())
        .input(&fs_in(), u64::MAX)
        .unwrap()
        .input(&second, 1)
        .unwrap()
        .output(fa_out(), 1)
        .unwrap()
        .build()
        .err();
    assert_eq!(err, Some(TransactionError::BalanceOverflow));
}

#[test]
fn built_transactions_are_deeply_immutable() {
    // The only operations on a built transaction are reads; this is a
    // compile-time property, so just exercise the accessor surface.
    let tx: Transaction<u64> = Fat0Builder::new(chain())
        .timestamp(TIMESTAMP)
        .unwrap()
        .input(&fs_in(), 150)
        .unwrap()
        .output(fa_out(), 150)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(tx.chain_id().to_string(), CHAIN);
    assert_eq!(tx.timestamp(), TIMESTAMP);
    assert_eq!(tx.inputs().len(), 1);
    assert_eq!(tx.outputs().len(), 1);
    assert!(tx.metadata().is_none());
    assert!(tx.token_metadata().is_none());
    assert!(tx.is_signed());
}
