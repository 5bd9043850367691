use std::path::Path;

use crate::bucket::DidBucket;
use crate::codec;
use crate::error::WalletError;
use crate::store::{KeyValueStore, NO_EXPIRY};

/// DID-keyed access to the buckets in a wallet store.
///
/// The repository owns its store handle; the handle is released when the
/// repository is dropped or [`close`](Self::close)d.
#[derive(Debug)]
pub struct WalletRepository {
    store: KeyValueStore,
}

impl WalletRepository {
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    /// Open the store at `path` and wrap it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        Ok(Self::new(KeyValueStore::open(path)?))
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    /// Persist a bucket under its DID, replacing whatever was stored before.
    ///
    /// No merge happens: fields absent from `bucket` are absent afterwards.
    pub fn store_bucket(&self, bucket: &DidBucket) -> Result<(), WalletError> {
        let bytes = codec::encode(bucket)?;
        self.store.set(&bucket.did, &bytes, NO_EXPIRY)?;
        tracing::debug!(did = %bucket.did, state = %bucket.state(), "bucket stored");
        Ok(())
    }

    /// Persist a bucket whose DID is not in the wallet yet.
    ///
    /// Fails with [`WalletError::AlreadyExists`] when a bucket is already
    /// stored under the DID; the check and the write are one transaction.
    pub fn create_bucket(&self, bucket: &DidBucket) -> Result<(), WalletError> {
        let bytes = codec::encode(bucket)?;
        self.store.insert(&bucket.did, &bytes, NO_EXPIRY)?;
        tracing::debug!(did = %bucket.did, state = %bucket.state(), "bucket created");
        Ok(())
    }

    /// Load the bucket stored under `did`.
    pub fn get_bucket_by_did(&self, did: &str) -> Result<DidBucket, WalletError> {
        let bytes = self.store.get(did)?;
        let bucket = codec::decode(&bytes)?;
        if bucket.did != did {
            tracing::error!(requested = did, found = %bucket.did, "bucket identifier mismatch");
            return Err(WalletError::Corruption {
                requested: did.to_string(),
                found: bucket.did,
            });
        }
        Ok(bucket)
    }

    /// Whether a bucket is stored under `did`.
    pub fn contains(&self, did: &str) -> Result<bool, WalletError> {
        match self.store.get(did) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete the bucket stored under `did`.
    pub fn remove(&self, did: &str) -> Result<(), WalletError> {
        self.store.delete(did)?;
        tracing::info!(did, "bucket removed");
        Ok(())
    }

    /// Every DID in the wallet.
    ///
    /// Entries whose envelope is damaged are logged and skipped. Any other
    /// failure while enumerating yields an empty list; the fault is only
    /// logged. Use [`try_all_keys`](Self::try_all_keys) to see it.
    pub fn all_keys(&self) -> Vec<String> {
        let mut dids = Vec::new();
        for key in self.store.keys() {
            match key {
                Ok(did) => dids.push(did),
                Err(WalletError::MalformedEntry { key, reason }) => {
                    tracing::warn!(%key, %reason, "skipping malformed wallet entry");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "enumerating wallet failed, returning no keys");
                    return Vec::new();
                }
            }
        }
        dids
    }

    /// Every DID in the wallet, failing on the first enumeration fault.
    pub fn try_all_keys(&self) -> Result<Vec<String>, WalletError> {
        self.store.keys().collect()
    }

    pub fn close(self) {
        self.store.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use essif_crypto::{generate_p256, generate_secp256k1};
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("essif-repo-test-{}", rand::random::<u64>()))
    }

    fn sample_bucket(did: &str) -> DidBucket {
        DidBucket::new(did)
            .with_issuance_key(generate_p256(format!("{did}#k1")).unwrap())
            .with_presentation_key(generate_p256(format!("{did}#k2")).unwrap())
    }

    #[test]
    fn test_store_and_get_bucket() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();

        let bucket = sample_bucket("did:example:123");
        repo.store_bucket(&bucket).unwrap();

        let loaded = repo.get_bucket_by_did("did:example:123").unwrap();
        assert_eq!(loaded.issuance_key, bucket.issuance_key);
        assert_eq!(loaded.presentation_key, bucket.presentation_key);
        assert!(loaded.admin_encryption_key.is_none());
        assert!(loaded.admin_transaction_key.is_none());
        assert!(loaded.admin_signing_key.is_none());
        assert!(loaded.document.is_none());
        assert!(loaded.token.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_store_bucket_overwrites_without_merge() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();

        let mut first = sample_bucket("did:example:123");
        first.token = Some("old-token".into());
        first.admin_signing_key = Some(generate_secp256k1("did:example:123#sig").unwrap());
        repo.store_bucket(&first).unwrap();

        let second = DidBucket::new("did:example:123")
            .with_presentation_key(generate_p256("did:example:123#new").unwrap());
        repo.store_bucket(&second).unwrap();

        let loaded = repo.get_bucket_by_did("did:example:123").unwrap();
        assert_eq!(loaded, second);
        assert!(loaded.token.is_none());
        assert!(loaded.admin_signing_key.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_incremental_updates_keep_earlier_fields() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();
        let did = "did:example:incremental";

        repo.store_bucket(&sample_bucket(did)).unwrap();

        let mut bucket = repo.get_bucket_by_did(did).unwrap();
        bucket.admin_signing_key = Some(generate_secp256k1(format!("{did}#sig")).unwrap());
        bucket.token = Some("token".into());
        repo.store_bucket(&bucket).unwrap();

        let mut bucket = repo.get_bucket_by_did(did).unwrap();
        bucket.admin_encryption_key = Some(generate_secp256k1(format!("{did}#enc")).unwrap());
        bucket.admin_transaction_key = Some(generate_secp256k1(format!("{did}#txn")).unwrap());
        repo.store_bucket(&bucket).unwrap();

        let loaded = repo.get_bucket_by_did(did).unwrap();
        assert_eq!(loaded, bucket);
        assert!(loaded.issuance_key.is_some());
        assert!(loaded.presentation_key.is_some());
        assert_eq!(loaded.token.as_deref(), Some("token"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_get_missing_bucket() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();
        assert!(repo
            .get_bucket_by_did("did:example:missing")
            .unwrap_err()
            .is_not_found());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_identifier_mismatch_is_corruption() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();

        let payload = codec::encode(&DidBucket::new("did:example:other")).unwrap();
        repo.store()
            .set("did:example:123", &payload, NO_EXPIRY)
            .unwrap();

        let err = repo.get_bucket_by_did("did:example:123").unwrap_err();
        match err {
            WalletError::Corruption { requested, found } => {
                assert_eq!(requested, "did:example:123");
                assert_eq!(found, "did:example:other");
            }
            other => panic!("expected corruption, got {other:?}"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_garbage_payload_is_parse_error() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();

        repo.store()
            .set("did:example:123", b"{not json", NO_EXPIRY)
            .unwrap();
        assert!(matches!(
            repo.get_bucket_by_did("did:example:123"),
            Err(WalletError::Parse(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_store_bucket_with_empty_did() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();
        assert!(repo.store_bucket(&DidBucket::new("")).is_err());
        assert!(repo.all_keys().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_all_keys_empty_wallet() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();
        assert!(repo.all_keys().is_empty());
        assert!(repo.try_all_keys().unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_all_keys_lists_every_did() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();

        for did in ["did:example:a", "did:example:b", "did:example:c"] {
            repo.store_bucket(&DidBucket::new(did)).unwrap();
        }
        let mut keys = repo.all_keys();
        keys.sort();
        assert_eq!(keys, vec!["did:example:a", "did:example:b", "did:example:c"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_all_keys_skips_damaged_entry() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();

        repo.store_bucket(&DidBucket::new("did:example:a")).unwrap();
        // A raw write shorter than the entry header, as a damaged file would hold.
        {
            let txn = repo.store().db_for_tests().transaction();
            txn.put(b"did:example:broken", [1u8, 2]).unwrap();
            txn.commit().unwrap();
        }

        assert!(matches!(
            repo.try_all_keys(),
            Err(WalletError::MalformedEntry { .. })
        ));
        assert_eq!(repo.all_keys(), vec!["did:example:a"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_create_bucket_refuses_existing_did() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();

        let first = sample_bucket("did:example:123");
        repo.create_bucket(&first).unwrap();
        assert!(matches!(
            repo.create_bucket(&sample_bucket("did:example:123")),
            Err(WalletError::AlreadyExists(_))
        ));
        assert_eq!(repo.get_bucket_by_did("did:example:123").unwrap(), first);
        assert!(repo.create_bucket(&DidBucket::new("")).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_contains_and_remove() {
        let dir = temp_dir();
        let repo = WalletRepository::open(&dir).unwrap();

        repo.store_bucket(&DidBucket::new("did:example:a")).unwrap();
        assert!(repo.contains("did:example:a").unwrap());
        assert!(!repo.contains("did:example:b").unwrap());

        repo.remove("did:example:a").unwrap();
        assert!(!repo.contains("did:example:a").unwrap());
        assert!(repo.remove("did:example:a").unwrap_err().is_not_found());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_independent_repositories() {
        let dir_a = temp_dir();
        let dir_b = temp_dir();
        let repo_a = WalletRepository::open(&dir_a).unwrap();
        let repo_b = WalletRepository::open(&dir_b).unwrap();

        repo_a.store_bucket(&DidBucket::new("did:example:a")).unwrap();
        assert!(repo_b.all_keys().is_empty());
        assert_eq!(repo_a.all_keys(), vec!["did:example:a"]);

        repo_a.close();
        repo_b.close();
        std::fs::remove_dir_all(&dir_a).ok();
        std::fs::remove_dir_all(&dir_b).ok();
    }
}
