use essif_crypto::Jwk;
use essif_wallet::Document;
use serde_json::{json, Value};

use crate::did::Did;
use crate::error::IdentityError;

pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
pub const JSON_WEB_KEY_2020: &str = "JsonWebKey2020";

/// Build the DID document for a freshly created identifier.
///
/// The document carries one `JsonWebKey2020` verification method holding
/// the public half of `issuance_key`, referenced from `authentication` and
/// `assertionMethod`.
pub fn build_document(did: &Did, issuance_key: &Jwk) -> Result<Document, IdentityError> {
    let public = issuance_key.public_key();
    let kid = public
        .kid()
        .ok_or_else(|| IdentityError::MissingField {
            did: did.to_string(),
            field: "issKey.kid",
        })?
        .to_string();

    let mut document = Document::new();
    document.insert("@context".into(), json!([DID_CONTEXT]));
    document.insert("id".into(), Value::String(did.to_string()));
    document.insert(
        "verificationMethod".into(),
        json!([{
            "id": kid,
            "type": JSON_WEB_KEY_2020,
            "controller": did.as_str(),
            "publicKeyJwk": serde_json::to_value(&public)?,
        }]),
    );
    document.insert("authentication".into(), json!([kid]));
    document.insert("assertionMethod".into(), json!([kid]));
    Ok(document)
}
