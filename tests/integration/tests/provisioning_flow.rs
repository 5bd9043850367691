//! Integration test: provisioning lifecycle across crates.
//!
//! Drives a DID through create → onboard → register → resolve with
//! essif-identity on top of an essif-wallet store, then checks what ends up
//! on disk.

use std::path::PathBuf;

use essif_crypto::{Curve, KeyType};
use essif_identity::{Did, IdentityError, LocalTrustList, Provisioner, TrustList};
use essif_wallet::{BucketState, WalletRepository};

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("essif-it-provision-{}", rand::random::<u64>()))
}

// =========================================================================
// Full lifecycle
// =========================================================================

#[tokio::test]
async fn test_full_lifecycle_persists_every_step() {
    let dir = temp_dir();
    let trust_list = LocalTrustList::new();

    let did = {
        let provisioner = Provisioner::new(WalletRepository::open(&dir).unwrap());
        let bucket = provisioner.create().unwrap();
        let did = Did::parse(&bucket.did).unwrap();
        provisioner
            .onboard(&did, &trust_list, "access-token")
            .await
            .expect("onboarding should succeed");
        provisioner
            .register(&did, &trust_list)
            .await
            .expect("registration should succeed");
        provisioner.into_wallet().close();
        did
    };

    // Reopen: the registered bucket survived the restart.
    let wallet = WalletRepository::open(&dir).unwrap();
    let bucket = wallet.get_bucket_by_did(did.as_str()).unwrap();
    assert_eq!(bucket.state(), BucketState::Registered);

    let issuance = bucket.issuance_key.as_ref().unwrap();
    assert_eq!(issuance.key_type(), KeyType::Ec);
    assert_eq!(issuance.curve(), Curve::P256);
    assert!(issuance.is_private());

    for key in [
        &bucket.admin_signing_key,
        &bucket.admin_encryption_key,
        &bucket.admin_transaction_key,
    ] {
        let key = key.as_ref().unwrap();
        assert_eq!(key.curve(), Curve::Secp256k1);
        assert!(key.kid().unwrap().starts_with(did.as_str()));
    }

    // The registered document is the one created locally.
    let resolved = trust_list.resolve_did(&did).await.unwrap();
    assert_eq!(Some(resolved), bucket.document);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_several_dids_progress_independently() {
    let dir = temp_dir();
    let trust_list = LocalTrustList::new();
    let provisioner = Provisioner::new(WalletRepository::open(&dir).unwrap());

    let a = Did::parse(&provisioner.create().unwrap().did).unwrap();
    let b = Did::parse(&provisioner.create().unwrap().did).unwrap();
    let c = Did::parse(&provisioner.create().unwrap().did).unwrap();

    provisioner.onboard(&b, &trust_list, "t").await.unwrap();
    provisioner.onboard(&c, &trust_list, "t").await.unwrap();
    provisioner.register(&c, &trust_list).await.unwrap();

    assert_eq!(provisioner.bucket(&a).unwrap().state(), BucketState::Created);
    assert_eq!(provisioner.bucket(&b).unwrap().state(), BucketState::Onboarded);
    assert_eq!(provisioner.bucket(&c).unwrap().state(), BucketState::Registered);
    assert_eq!(trust_list.registered_count(), 1);

    let mut listed = provisioner.list();
    listed.sort();
    let mut expected = vec![a.to_string(), b.to_string(), c.to_string()];
    expected.sort();
    assert_eq!(listed, expected);

    std::fs::remove_dir_all(&dir).ok();
}

// =========================================================================
// Failure paths
// =========================================================================

#[tokio::test]
async fn test_onboard_without_access_token_keeps_created_state() {
    let dir = temp_dir();
    let trust_list = LocalTrustList::new();
    let provisioner = Provisioner::new(WalletRepository::open(&dir).unwrap());
    let created = provisioner.create().unwrap();
    let did = Did::parse(&created.did).unwrap();

    let result = provisioner.onboard(&did, &trust_list, "  ").await;
    assert!(matches!(result, Err(IdentityError::TrustList(_))));
    assert_eq!(provisioner.bucket(&did).unwrap(), created);

    // Retrying with a token works.
    provisioner.onboard(&did, &trust_list, "access").await.unwrap();
    assert_eq!(provisioner.bucket(&did).unwrap().state(), BucketState::Onboarded);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_resolve_unregistered_did_fails() {
    let dir = temp_dir();
    let trust_list = LocalTrustList::new();
    let provisioner = Provisioner::new(WalletRepository::open(&dir).unwrap());
    let did = Did::parse(&provisioner.create().unwrap().did).unwrap();

    let result = provisioner.resolve(&did, &trust_list).await;
    assert!(matches!(result, Err(IdentityError::DidNotFound(_))));

    std::fs::remove_dir_all(&dir).ok();
}
