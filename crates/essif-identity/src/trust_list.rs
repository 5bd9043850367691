use async_trait::async_trait;
use dashmap::DashMap;
use essif_crypto::Jwk;
use essif_wallet::Document;
use uuid::Uuid;

use crate::did::Did;
use crate::error::IdentityError;

/// Everything a trust list needs to register a DID document.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationRequest<'a> {
    pub controller: &'a Did,
    pub document: &'a Document,
    pub document_metadata: &'a Document,
    pub token: &'a str,
    pub signing_key: &'a Jwk,
    pub encryption_key: &'a Jwk,
    pub transaction_key: &'a Jwk,
}

/// The identity trust-list service the provisioning steps talk to.
///
/// Implementations own the network protocol; the wallet only hands over
/// keys and documents and keeps what comes back.
#[async_trait]
pub trait TrustList: Send + Sync {
    /// Onboard the controller of `did`, returning the authorization token.
    async fn onboard(
        &self,
        did: &Did,
        signing_key: &Jwk,
        access_token: &str,
    ) -> Result<String, IdentityError>;

    /// Register the DID document described by `request`.
    async fn register_did(&self, request: RegistrationRequest<'_>) -> Result<(), IdentityError>;

    /// Resolve a DID to its registered document.
    async fn resolve_did(&self, did: &Did) -> Result<Document, IdentityError>;
}

/// In-process trust list that keeps onboarded controllers and registered
/// documents in memory.
#[derive(Debug, Default)]
pub struct LocalTrustList {
    /// Issued authorization token -> DID it was issued to.
    tokens: DashMap<String, String>,
    /// DID -> registered document.
    documents: DashMap<String, Document>,
}

impl LocalTrustList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered_count(&self) -> usize {
        self.documents.len()
    }
}

#[async_trait]
impl TrustList for LocalTrustList {
    async fn onboard(
        &self,
        did: &Did,
        signing_key: &Jwk,
        access_token: &str,
    ) -> Result<String, IdentityError> {
        if access_token.trim().is_empty() {
            return Err(IdentityError::TrustList("access token is required".into()));
        }
        if !signing_key.is_private() {
            return Err(IdentityError::TrustList(
                "onboarding needs the private signing key".into(),
            ));
        }
        let token = format!("vp-{}", Uuid::new_v4().simple());
        self.tokens.insert(token.clone(), did.to_string());
        tracing::debug!(did = %did, "controller onboarded");
        Ok(token)
    }

    async fn register_did(&self, request: RegistrationRequest<'_>) -> Result<(), IdentityError> {
        let did = request.controller.as_str();
        match self.tokens.get(request.token) {
            Some(owner) if owner.value() == did => {}
            _ => {
                return Err(IdentityError::TrustList(format!(
                    "token was not issued to {did}"
                )))
            }
        }
        if request.document.get("id").and_then(|id| id.as_str()) != Some(did) {
            return Err(IdentityError::TrustList(
                "document id does not match controller".into(),
            ));
        }
        if self.documents.contains_key(did) {
            return Err(IdentityError::DuplicateDid(did.to_string()));
        }

        self.documents.insert(did.to_string(), request.document.clone());
        tracing::debug!(did, "DID document registered");
        Ok(())
    }

    async fn resolve_did(&self, did: &Did) -> Result<Document, IdentityError> {
        self.documents
            .get(did.as_str())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| IdentityError::DidNotFound(did.to_string()))
    }
}
