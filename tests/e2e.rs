//! End-to-end integration tests for the Kestrel transaction library.
//!
//! These tests exercise the full client-side lifecycle: keyring
//! creation, transaction construction, fill from a provider, sender and
//! fee-payer signing, raw encoding, decoding, and multi-party signature
//! combination. They prove that the layers compose and that the bytes
//! that leave one party survive the trip through another untouched.
//!
//! Each test stands alone. No shared state, no test ordering
//! dependencies, no flaky failures.

use primitive_types::U256;

use kestrel_protocol::account::{AccountKey, KeyRole};
use kestrel_protocol::keyring::{self, recover, MultiSigOptions, PrivateKey};
use kestrel_protocol::provider::StaticChainData;
use kestrel_protocol::signature::SignatureData;
use kestrel_protocol::transaction::{Transaction, TxType};
use kestrel_protocol::types::Address;
use kestrel_protocol::wallet::Wallet;
use kestrel_protocol::TransactionError;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const CHAIN_ID: u64 = 1001;

fn provider() -> StaticChainData {
    StaticChainData {
        gas_price: U256::from(25_000_000_000u64),
        chain_id: CHAIN_ID,
        nonce: 0,
    }
}

fn key(seed: u8) -> PrivateKey {
    PrivateKey::from_slice(&[seed; 32]).expect("test key")
}

fn recipient() -> Address {
    Address::from_hex("0xdca786ce39b074966e8a9eae16eac90783974d80").expect("recipient")
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn value_transfer_full_lifecycle() {
    let sender = keyring::generate();
    let mut tx = Transaction::builder(TxType::ValueTransfer)
        .from(sender.address())
        .to(recipient())
        .value(1_000_000_000_000_000_000u64)
        .gas(25_000)
        .build()
        .expect("build");

    tx.fill_and_sign(&provider(), &sender, None)
        .await
        .expect("fill and sign");
    assert_eq!(tx.nonce(), Some(0));
    assert_eq!(tx.chain_id(), Some(CHAIN_ID));

    let raw = tx.raw_transaction().expect("raw");
    let decoded = Transaction::from_raw_transaction(&raw).expect("decode");
    assert_eq!(decoded.from(), sender.address());
    assert_eq!(decoded.to(), Some(recipient()));
    assert_eq!(decoded.signatures(), tx.signatures());

    // The signature on the decoded copy still recovers the sender.
    let mut verifiable = decoded.clone();
    verifiable.set_chain_id(CHAIN_ID);
    let hash = verifiable.hash_for_signature().expect("hash");
    let recovered = recover(&hash, &verifiable.signatures()[0], CHAIN_ID).expect("recover");
    assert_eq!(recovered.to_address(), sender.address());
}

#[tokio::test]
async fn fee_delegated_two_party_flow() {
    let sender = keyring::generate();
    let payer = keyring::generate();
    let provider = provider();

    // The sender builds, fills, and signs its copy.
    let mut sender_copy = Transaction::builder(TxType::FeeDelegatedValueTransfer)
        .from(sender.address())
        .to(recipient())
        .value(7u64)
        .gas(30_000)
        .build()
        .expect("build");
    sender_copy
        .fill_and_sign(&provider, &sender, None)
        .await
        .expect("sender sign");
    let sender_raw = sender_copy.raw_transaction().expect("sender raw");
    let sender_hash_before = sender_copy.sender_tx_hash().expect("sender hash");

    // The fee payer receives the raw bytes, co-signs, and returns them.
    let mut payer_copy = Transaction::from_raw_transaction(&sender_raw).expect("decode");
    payer_copy.set_chain_id(CHAIN_ID);
    payer_copy
        .sign_as_fee_payer(&payer, None)
        .expect("fee payer sign");
    let payer_raw = payer_copy.raw_transaction().expect("payer raw");

    // The sender folds the co-signed copy back in.
    let combined_raw = sender_copy
        .combine_signed_raw_transactions(&[payer_raw])
        .expect("combine");
    assert_eq!(sender_copy.fee_payer(), Some(payer.address()));
    assert_eq!(sender_copy.signatures().len(), 1);
    assert_eq!(sender_copy.fee_payer_signatures().len(), 1);

    // Fee-payer material never disturbs the sender transaction hash.
    assert_eq!(
        sender_copy.sender_tx_hash().expect("sender hash"),
        sender_hash_before
    );

    let finalized = Transaction::from_raw_transaction(&combined_raw).expect("decode combined");
    assert_eq!(finalized.fee_payer(), Some(payer.address()));
    assert_eq!(finalized.fee_payer_signatures().len(), 1);
}

#[tokio::test]
async fn weighted_multisig_combination() {
    let address = Address::new([0x0a; 20]);
    let holders = [key(0x11), key(0x22), key(0x33)];
    let provider = provider();

    let unsigned = Transaction::builder(TxType::FeeDelegatedValueTransfer)
        .from(address)
        .to(recipient())
        .value(1u64)
        .gas(30_000)
        .build()
        .expect("build");

    // Each holder signs an independent copy of the same transaction.
    let mut raws = Vec::new();
    for holder in &holders {
        let keyring = keyring::with_single_key(address, holder.clone());
        let mut copy = unsigned.clone();
        copy.fill_and_sign(&provider, &keyring, None)
            .await
            .expect("holder sign");
        raws.push(copy.raw_transaction().expect("raw"));
    }

    let mut combined = unsigned.clone();
    combined.fill(&provider).await.expect("fill");
    combined
        .combine_signed_raw_transactions(&raws)
        .expect("combine");
    assert_eq!(combined.signatures().len(), 3);

    // Every attached signature recovers its own holder.
    let hash = combined.hash_for_signature().expect("hash");
    for (signature, holder) in combined.signatures().iter().zip(&holders) {
        let recovered = recover(&hash, signature, CHAIN_ID).expect("recover");
        assert_eq!(recovered, holder.public_key());
    }
}

// ---------------------------------------------------------------------------
// Account updates and the key model
// ---------------------------------------------------------------------------

#[tokio::test]
async fn account_update_installs_a_derived_multisig() {
    let address = Address::new([0x0b; 20]);
    let keyring = keyring::with_keys(address, vec![key(0x44), key(0x55)]).expect("keyring");
    let options = MultiSigOptions {
        threshold: 2,
        weights: vec![1, 1],
    };
    let account = keyring.to_account(Some(&options)).expect("to_account");

    let mut tx = Transaction::builder(TxType::AccountUpdate)
        .from(address)
        .account(account.clone())
        .gas(80_000)
        .build()
        .expect("build");
    tx.fill_and_sign(&provider(), &keyring, None)
        .await
        .expect("sign");

    // The update role is served by the same keys here, so both sign.
    assert_eq!(tx.signatures().len(), 2);

    let decoded =
        Transaction::from_raw_transaction(&tx.raw_transaction().expect("raw")).expect("decode");
    assert_eq!(decoded.account(), Some(&account));
}

#[test]
fn role_based_keyring_splits_authority() {
    let address = Address::new([0x0c; 20]);
    let keyring = keyring::with_role_keys(
        address,
        [vec![key(0x61)], vec![key(0x62)], vec![key(0x63)]],
    )
    .expect("keyring");

    let account = keyring.to_account(None).expect("to_account");
    match &account {
        AccountKey::RoleBased(roles) => {
            for role in KeyRole::all() {
                assert!(roles.role(role).is_some(), "{role} missing");
            }
        }
        other => panic!("expected role-based key, got {other:?}"),
    }

    // The account-key wire form survives its trip through an update tx.
    let mut tx = Transaction::builder(TxType::AccountUpdate)
        .from(address)
        .account(account.clone())
        .gas(80_000)
        .nonce(1)
        .gas_price(25_000_000_000u64)
        .chain_id(CHAIN_ID)
        .build()
        .expect("build");
    tx.sign(&keyring, None).expect("sign");
    let decoded =
        Transaction::from_raw_transaction(&tx.raw_transaction().expect("raw")).expect("decode");
    assert_eq!(decoded.account(), Some(&account));
}

// ---------------------------------------------------------------------------
// Wallet routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wallet_routes_sender_and_fee_payer() {
    let sender = keyring::generate();
    let payer = keyring::generate();
    let mut wallet = Wallet::new();
    wallet.add(sender.clone()).expect("add sender");
    wallet.add(payer.clone()).expect("add payer");

    let mut tx = Transaction::builder(TxType::FeeDelegatedCancel)
        .from(sender.address())
        .gas(21_000)
        .build()
        .expect("build");
    tx.fill(&provider()).await.expect("fill");

    wallet
        .sign(&sender.address(), &mut tx, None)
        .expect("wallet sender sign");
    wallet
        .sign_as_fee_payer(&payer.address(), &mut tx, None)
        .expect("wallet payer sign");

    assert!(tx.is_signed());
    assert_eq!(tx.fee_payer(), Some(payer.address()));
    assert!(tx.raw_transaction().is_ok());
}

// ---------------------------------------------------------------------------
// Wire fidelity
// ---------------------------------------------------------------------------

#[test]
fn account_update_reference_framing() {
    let from = recipient();
    let mut tx = Transaction::builder(TxType::AccountUpdate)
        .from(from)
        .nonce(0)
        .gas_price(0x5d21dba00u64)
        .gas(0x30d40)
        .account(AccountKey::Legacy)
        .build()
        .expect("build");
    tx.append_signature(SignatureData::new([0x0f, 0xea], [0xaa; 32], [0xbb; 32]));

    let expected = format!(
        "0x20f86c808505d21dba0083030d4094dca786ce39b074966e8a9eae16eac90783974d808201c0f847f845820feaa0{}a0{}",
        "aa".repeat(32),
        "bb".repeat(32),
    );
    assert_eq!(tx.raw_transaction().expect("raw"), expected);
}

#[test]
fn tampered_combine_input_is_rejected_atomically() {
    let address = Address::new([0x0d; 20]);
    let alice = keyring::with_single_key(address, key(0x71));

    let build = |value: u64| {
        Transaction::builder(TxType::FeeDelegatedValueTransfer)
            .from(address)
            .to(recipient())
            .value(value)
            .gas(30_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .chain_id(CHAIN_ID)
            .build()
            .expect("build")
    };

    let mut good = build(1);
    good.sign(&alice, None).expect("sign");
    let mut tampered = build(2);
    tampered.sign(&alice, None).expect("sign");

    let mut combined = build(1);
    let err = combined
        .combine_signed_raw_transactions(&[
            good.raw_transaction().expect("raw"),
            tampered.raw_transaction().expect("raw"),
        ])
        .expect_err("must reject");
    assert_eq!(err, TransactionError::CombineMismatch { field: "value" });
    assert!(combined.signatures().is_empty());
}
