use std::fmt;
use std::str::FromStr;

use rand::RngCore;

use crate::error::IdentityError;

/// Method name of EBSI identifiers.
pub const EBSI_METHOD: &str = "ebsi";

/// Version byte of an EBSI legal-entity identifier.
const EBSI_LEGAL_ENTITY_VERSION: u8 = 0x01;

/// Random bytes following the version byte.
const EBSI_SUBJECT_LEN: usize = 16;

/// A decentralized identifier: `did:<method>:<method-specific-id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Did(String);

impl Did {
    /// Parse and validate a DID string.
    ///
    /// `did:ebsi:` identifiers must additionally carry a base58btc
    /// multibase (`z`) legal-entity subject.
    pub fn parse(uri: &str) -> Result<Self, IdentityError> {
        let rest = uri
            .strip_prefix("did:")
            .ok_or_else(|| IdentityError::InvalidDid(format!("missing 'did:' scheme: {uri}")))?;
        let (method, id) = rest.split_once(':').ok_or_else(|| {
            IdentityError::InvalidDid(format!(
                "expected 'did:<method>:<identifier>', got: {uri}"
            ))
        })?;

        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(IdentityError::InvalidDid(format!(
                "invalid method name '{method}' in {uri}"
            )));
        }
        if id.is_empty() || !id.chars().all(is_id_char) {
            return Err(IdentityError::InvalidDid(format!(
                "invalid method-specific identifier in {uri}"
            )));
        }
        if method == EBSI_METHOD {
            validate_ebsi_subject(uri, id)?;
        }

        Ok(Self(uri.to_string()))
    }

    /// Generate a new EBSI legal-entity DID:
    /// `did:ebsi:z` + base58btc(0x01 || 16 random bytes).
    pub fn generate_ebsi() -> Self {
        let mut subject = [0u8; 1 + EBSI_SUBJECT_LEN];
        subject[0] = EBSI_LEGAL_ENTITY_VERSION;
        rand::thread_rng().fill_bytes(&mut subject[1..]);
        Self(format!(
            "did:{}:z{}",
            EBSI_METHOD,
            bs58::encode(subject).into_string()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    pub fn method_specific_id(&self) -> &str {
        self.0.splitn(3, ':').nth(2).unwrap_or_default()
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Did {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '%')
}

fn validate_ebsi_subject(uri: &str, id: &str) -> Result<(), IdentityError> {
    let encoded = id.strip_prefix('z').ok_or_else(|| {
        IdentityError::InvalidDid(format!("EBSI identifier must be base58btc ('z'): {uri}"))
    })?;
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| IdentityError::InvalidDid(format!("invalid base58 in {uri}: {e}")))?;
    match bytes.split_first() {
        Some((&EBSI_LEGAL_ENTITY_VERSION, subject)) if subject.len() == EBSI_SUBJECT_LEN => Ok(()),
        Some((&EBSI_LEGAL_ENTITY_VERSION, subject)) => Err(IdentityError::InvalidDid(format!(
            "EBSI subject must be {} bytes, got {}: {uri}",
            EBSI_SUBJECT_LEN,
            subject.len()
        ))),
        _ => Err(IdentityError::InvalidDid(format!(
            "unsupported EBSI identifier version: {uri}"
        ))),
    }
}
