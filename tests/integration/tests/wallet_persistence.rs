//! Integration test: bucket storage through the repository and the raw
//! key-value store together.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use essif_crypto::{generate_p256, generate_secp256k1, new_key_id};
use essif_wallet::{
    DidBucket, KeyValueStore, ManualClock, WalletRepository, EXPIRY_GRACE, NO_EXPIRY,
};

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("essif-it-wallet-{}", rand::random::<u64>()))
}

fn sample_bucket(did: &str) -> DidBucket {
    let mut bucket = DidBucket::new(did)
        .with_issuance_key(generate_p256(new_key_id(did)).unwrap())
        .with_presentation_key(generate_p256(new_key_id(did)).unwrap());
    bucket.admin_signing_key = Some(generate_secp256k1(new_key_id(did)).unwrap());
    bucket.token = Some("vp-token".into());
    bucket
}

#[test]
fn test_buckets_survive_reopen() {
    let dir = temp_dir();
    let stored = sample_bucket("did:ebsi:zPersist");

    {
        let wallet = WalletRepository::open(&dir).unwrap();
        wallet.store_bucket(&stored).unwrap();
        wallet.close();
    }

    let wallet = WalletRepository::open(&dir).unwrap();
    assert_eq!(wallet.get_bucket_by_did("did:ebsi:zPersist").unwrap(), stored);
    assert_eq!(wallet.all_keys(), vec!["did:ebsi:zPersist".to_string()]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_private_keys_round_trip_through_storage() {
    let dir = temp_dir();
    let wallet = WalletRepository::open(&dir).unwrap();
    let stored = sample_bucket("did:ebsi:zKeys");
    wallet.store_bucket(&stored).unwrap();

    let loaded = wallet.get_bucket_by_did("did:ebsi:zKeys").unwrap();
    let original = stored.admin_signing_key.as_ref().unwrap();
    let restored = loaded.admin_signing_key.as_ref().unwrap();
    assert!(restored.is_private());
    assert_eq!(
        restored.secret_bytes().unwrap().unwrap().as_slice(),
        original.secret_bytes().unwrap().unwrap().as_slice()
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_stored_payload_is_sparse_json() {
    let dir = temp_dir();
    let store = KeyValueStore::open(&dir).unwrap();
    let wallet = WalletRepository::new(store);
    wallet.store_bucket(&DidBucket::new("did:ebsi:zSparse")).unwrap();

    let raw = wallet.store().get("did:ebsi:zSparse").unwrap();
    let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(value, serde_json::json!({"did": "did:ebsi:zSparse"}));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_ttl_entries_next_to_buckets() {
    let dir = temp_dir();
    let clock = Arc::new(ManualClock::default());
    let store = KeyValueStore::open_with_clock(&dir, clock.clone()).unwrap();

    store.set("session", b"short-lived", Duration::from_secs(10)).unwrap();
    store.set("did:ebsi:zForever", b"{}", NO_EXPIRY).unwrap();

    clock.advance(chrono::Duration::seconds(14));
    assert_eq!(store.get("session").unwrap(), b"short-lived");

    clock.advance(chrono::Duration::from_std(EXPIRY_GRACE).unwrap());
    assert!(store.get("session").unwrap_err().is_not_found());

    let keys: Vec<String> = store.keys().collect::<Result<_, _>>().unwrap();
    assert_eq!(keys, vec!["did:ebsi:zForever".to_string()]);

    std::fs::remove_dir_all(&dir).ok();
}
