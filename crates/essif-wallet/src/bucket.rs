use std::fmt;

use essif_crypto::Jwk;
use serde::{Deserialize, Serialize};

/// Opaque DID document, kept as the JSON object it was built or received as.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Everything the wallet holds for one decentralized identifier.
///
/// Each optional field is absent until the provisioning step that produces
/// it has run. Absent fields are never written out, and `Some` of an empty
/// value (an empty token, an empty document) stays distinct from `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidBucket {
    /// The DID; also the store key the bucket is persisted under.
    pub did: String,

    #[serde(rename = "issKey", default, skip_serializing_if = "Option::is_none")]
    pub issuance_key: Option<Jwk>,

    #[serde(rename = "presKey", default, skip_serializing_if = "Option::is_none")]
    pub presentation_key: Option<Jwk>,

    #[serde(rename = "encKey", default, skip_serializing_if = "Option::is_none")]
    pub admin_encryption_key: Option<Jwk>,

    #[serde(rename = "txnKey", default, skip_serializing_if = "Option::is_none")]
    pub admin_transaction_key: Option<Jwk>,

    #[serde(rename = "sigKey", default, skip_serializing_if = "Option::is_none")]
    pub admin_signing_key: Option<Jwk>,

    #[serde(rename = "doc", default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Provisioning progress of a bucket, derived from which fields are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketState {
    /// DID, document, issuance and presentation keys.
    Created,
    /// Plus admin signing key and authorization token.
    Onboarded,
    /// Plus admin encryption and transaction keys. Terminal.
    Registered,
}

impl fmt::Display for BucketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Onboarded => write!(f, "onboarded"),
            Self::Registered => write!(f, "registered"),
        }
    }
}

impl DidBucket {
    /// A bucket holding only its identifier.
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            issuance_key: None,
            presentation_key: None,
            admin_encryption_key: None,
            admin_transaction_key: None,
            admin_signing_key: None,
            document: None,
            token: None,
        }
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_issuance_key(mut self, key: Jwk) -> Self {
        self.issuance_key = Some(key);
        self
    }

    pub fn with_presentation_key(mut self, key: Jwk) -> Self {
        self.presentation_key = Some(key);
        self
    }

    pub fn state(&self) -> BucketState {
        let onboarded = self.admin_signing_key.is_some() && self.token.is_some();
        let registered =
            self.admin_encryption_key.is_some() && self.admin_transaction_key.is_some();
        match (onboarded, registered) {
            (true, true) => BucketState::Registered,
            (true, false) => BucketState::Onboarded,
            _ => BucketState::Created,
        }
    }

    /// Copy of the bucket with every private key member removed.
    pub fn redacted(&self) -> Self {
        let public = |key: &Option<Jwk>| key.as_ref().map(Jwk::public_key);
        Self {
            did: self.did.clone(),
            issuance_key: public(&self.issuance_key),
            presentation_key: public(&self.presentation_key),
            admin_encryption_key: public(&self.admin_encryption_key),
            admin_transaction_key: public(&self.admin_transaction_key),
            admin_signing_key: public(&self.admin_signing_key),
            document: self.document.clone(),
            token: self.token.as_ref().map(|_| "<redacted>".to_string()),
        }
    }
}
