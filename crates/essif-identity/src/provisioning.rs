//! The provisioning workflow: create → onboard → register → resolve.
//!
//! Each step loads the bucket, adds what it generated, and stores the whole
//! bucket back. A step whose trust-list call fails stores nothing, so the
//! bucket stays in its previous state and the step can be retried.

use essif_crypto::{generate_p256, generate_secp256k1, new_key_id, Jwk};
use essif_wallet::{BucketState, DidBucket, Document, WalletError, WalletRepository};
use serde_json::Value;

use crate::did::Did;
use crate::document::build_document;
use crate::error::IdentityError;
use crate::trust_list::{RegistrationRequest, TrustList};

/// Drives a wallet's buckets through the provisioning states.
#[derive(Debug)]
pub struct Provisioner {
    wallet: WalletRepository,
}

impl Provisioner {
    pub fn new(wallet: WalletRepository) -> Self {
        Self { wallet }
    }

    pub fn wallet(&self) -> &WalletRepository {
        &self.wallet
    }

    pub fn into_wallet(self) -> WalletRepository {
        self.wallet
    }

    /// Step 1: create a new EBSI DID with its document, issuance key and
    /// presentation key.
    pub fn create(&self) -> Result<DidBucket, IdentityError> {
        self.create_with_did(Did::generate_ebsi())
    }

    /// Step 1 for a caller-chosen DID. Fails with
    /// [`IdentityError::DuplicateDid`] if the wallet already holds it.
    pub fn create_with_did(&self, did: Did) -> Result<DidBucket, IdentityError> {
        let issuance_key = generate_p256(new_key_id(did.as_str()))?;
        let presentation_key = generate_p256(new_key_id(did.as_str()))?;
        let document = build_document(&did, &issuance_key)?;

        let bucket = DidBucket::new(did.as_str())
            .with_document(document)
            .with_issuance_key(issuance_key)
            .with_presentation_key(presentation_key);
        match self.wallet.create_bucket(&bucket) {
            Ok(()) => {}
            Err(WalletError::AlreadyExists(_)) => {
                return Err(IdentityError::DuplicateDid(did.to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(did = %did, "DID created");
        Ok(bucket)
    }

    /// Step 2: generate the admin signing key and onboard the controller.
    pub async fn onboard(
        &self,
        did: &Did,
        trust_list: &dyn TrustList,
        access_token: &str,
    ) -> Result<DidBucket, IdentityError> {
        let mut bucket = self.load_in_state(did, BucketState::Created)?;

        let signing_key = generate_secp256k1(new_key_id(did.as_str()))?;
        let token = trust_list.onboard(did, &signing_key, access_token).await?;

        bucket.admin_signing_key = Some(signing_key);
        bucket.token = Some(token);
        self.wallet.store_bucket(&bucket)?;

        tracing::info!(did = %did, "DID controller onboarded");
        Ok(bucket)
    }

    /// Step 3: generate the admin encryption and transaction keys and
    /// register the DID document.
    pub async fn register(
        &self,
        did: &Did,
        trust_list: &dyn TrustList,
    ) -> Result<DidBucket, IdentityError> {
        let mut bucket = self.load_in_state(did, BucketState::Onboarded)?;

        let encryption_key = generate_secp256k1(new_key_id(did.as_str()))?;
        let transaction_key = generate_secp256k1(new_key_id(did.as_str()))?;
        let mut metadata = Document::new();
        metadata.insert("deactivated".into(), Value::Bool(false));

        {
            let document = required(did, bucket.document.as_ref(), "doc")?;
            let token = required(did, bucket.token.as_deref(), "token")?;
            let signing_key: &Jwk =
                required(did, bucket.admin_signing_key.as_ref(), "sigKey")?;

            trust_list
                .register_did(RegistrationRequest {
                    controller: did,
                    document,
                    document_metadata: &metadata,
                    token,
                    signing_key,
                    encryption_key: &encryption_key,
                    transaction_key: &transaction_key,
                })
                .await?;
        }

        bucket.admin_encryption_key = Some(encryption_key);
        bucket.admin_transaction_key = Some(transaction_key);
        self.wallet.store_bucket(&bucket)?;

        tracing::info!(did = %did, "DID document registered");
        Ok(bucket)
    }

    /// Step 4: resolve a DID through the trust list. Does not touch the
    /// wallet.
    pub async fn resolve(
        &self,
        did: &Did,
        trust_list: &dyn TrustList,
    ) -> Result<Document, IdentityError> {
        let document = trust_list.resolve_did(did).await?;
        tracing::debug!(did = %did, "DID resolved");
        Ok(document)
    }

    /// Bucket stored for `did`.
    pub fn bucket(&self, did: &Did) -> Result<DidBucket, IdentityError> {
        Ok(self.wallet.get_bucket_by_did(did.as_str())?)
    }

    /// Every DID in the wallet.
    pub fn list(&self) -> Vec<String> {
        self.wallet.all_keys()
    }

    fn load_in_state(
        &self,
        did: &Did,
        expected: BucketState,
    ) -> Result<DidBucket, IdentityError> {
        let bucket = self.bucket(did)?;
        let state = bucket.state();
        if state != expected {
            return Err(IdentityError::InvalidState {
                did: did.to_string(),
                state,
                expected,
            });
        }
        Ok(bucket)
    }
}

fn required<'a, T: ?Sized>(
    did: &Did,
    value: Option<&'a T>,
    field: &'static str,
) -> Result<&'a T, IdentityError> {
    value.ok_or_else(|| IdentityError::MissingField {
        did: did.to_string(),
        field,
    })
}
