use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;

/// Length in bytes of every coordinate and private scalar we accept.
const MATERIAL_LEN: usize = 32;

/// JWK `kty` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Elliptic curve key (`EC`), carries `x` and `y`.
    Ec,
    /// Octet key pair (`OKP`), carries `x` only.
    Okp,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ec => "EC",
            Self::Okp => "OKP",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWK `crv` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256 (`secp256r1`), issuance and presentation keys.
    P256,
    Secp256k1,
    Ed25519,
}

impl Curve {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "Ed25519",
        }
    }

    /// The key type a curve is carried under.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::P256 | Self::Secp256k1 => KeyType::Ec,
            Self::Ed25519 => KeyType::Okp,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON Web Key (RFC 7517) as stored in the wallet.
///
/// Construction always goes through validation: the curve must match the
/// key type, coordinates must be base64url and decode to a point on the
/// curve, and a private part, when present, must belong to the public part.
/// Members we do not interpret (`use`, `alg`, ...) are kept verbatim in
/// `extra` so a decoded key serializes back to the same members.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawJwk")]
pub struct Jwk {
    curve: Curve,
    x: String,
    y: Option<String>,
    d: Option<String>,
    kid: Option<String>,
    extra: BTreeMap<String, serde_json::Value>,
}

/// Wire shape of a JWK before validation.
#[derive(Deserialize)]
struct RawJwk {
    kty: String,
    #[serde(default)]
    crv: Option<String>,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
    #[serde(default)]
    d: Option<String>,
    #[serde(default)]
    kid: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<RawJwk> for Jwk {
    type Error = CryptoError;

    fn try_from(raw: RawJwk) -> Result<Self, Self::Error> {
        let crv = raw.crv.unwrap_or_default();
        let curve = match (raw.kty.as_str(), crv.as_str()) {
            ("EC", "P-256") => Some(Curve::P256),
            ("EC", "secp256k1") => Some(Curve::Secp256k1),
            ("OKP", "Ed25519") => Some(Curve::Ed25519),
            _ => None,
        };
        let Some(curve) = curve else {
            return Err(CryptoError::UnsupportedKey { kty: raw.kty, crv });
        };
        let x = raw
            .x
            .ok_or_else(|| CryptoError::InvalidKey("missing member 'x'".into()))?;

        let jwk = Self {
            curve,
            x,
            y: raw.y,
            d: raw.d,
            kid: raw.kid,
            extra: raw.extra,
        };
        jwk.validate()?;
        Ok(jwk)
    }
}

impl Jwk {
    /// Build a key from base64url-encoded members and validate it.
    pub fn from_parts(
        curve: Curve,
        x: String,
        y: Option<String>,
        d: Option<String>,
        kid: Option<String>,
    ) -> Result<Self, CryptoError> {
        let jwk = Self {
            curve,
            x,
            y,
            d,
            kid,
            extra: BTreeMap::new(),
        };
        jwk.validate()?;
        Ok(jwk)
    }

    pub fn key_type(&self) -> KeyType {
        self.curve.key_type()
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Key identifier label (`kid`).
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// Base64url `x` coordinate (or Ed25519 public key).
    pub fn x(&self) -> &str {
        &self.x
    }

    /// Base64url `y` coordinate, EC keys only.
    pub fn y(&self) -> Option<&str> {
        self.y.as_deref()
    }

    /// Whether the key carries private material.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// Member not interpreted by this crate, e.g. `alg` or `use`.
    pub fn extra(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }

    /// The same key with the private member removed.
    pub fn public_key(&self) -> Jwk {
        Jwk {
            curve: self.curve,
            x: self.x.clone(),
            y: self.y.clone(),
            d: None,
            kid: self.kid.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Decoded private material, wiped when the returned buffer is dropped.
    pub fn secret_bytes(&self) -> Option<Result<Zeroizing<Vec<u8>>, CryptoError>> {
        self.d
            .as_deref()
            .map(|d| decode_member("d", d).map(Zeroizing::new))
    }

    fn validate(&self) -> Result<(), CryptoError> {
        let x = decode_member("x", &self.x)?;
        let d = match self.d.as_deref() {
            Some(d) => Some(Zeroizing::new(decode_member("d", d)?)),
            None => None,
        };

        match self.curve {
            Curve::Ed25519 => {
                if self.y.is_some() {
                    return Err(CryptoError::InvalidKey(
                        "OKP key must not carry member 'y'".into(),
                    ));
                }
                let x: [u8; MATERIAL_LEN] = fixed_len("x", &x)?;
                let public = ed25519_dalek::VerifyingKey::from_bytes(&x)
                    .map_err(|e| CryptoError::InvalidKey(format!("invalid Ed25519 point: {e}")))?;
                if let Some(d) = d {
                    let mut seed: [u8; MATERIAL_LEN] = fixed_len("d", &d)?;
                    let signing = ed25519_dalek::SigningKey::from_bytes(&seed);
                    seed.zeroize();
                    if signing.verifying_key() != public {
                        return Err(mismatched_private_key());
                    }
                }
            }
            Curve::P256 | Curve::Secp256k1 => {
                let y = self
                    .y
                    .as_deref()
                    .ok_or_else(|| CryptoError::InvalidKey("missing member 'y'".into()))?;
                let y = decode_member("y", y)?;
                let x: [u8; MATERIAL_LEN] = fixed_len("x", &x)?;
                let y: [u8; MATERIAL_LEN] = fixed_len("y", &y)?;

                let mut sec1 = Vec::with_capacity(1 + 2 * MATERIAL_LEN);
                sec1.push(0x04);
                sec1.extend_from_slice(&x);
                sec1.extend_from_slice(&y);
                let d = d.as_deref().map(Vec::as_slice);
                if let Some(d) = d {
                    fixed_len::<MATERIAL_LEN>("d", d)?;
                }

                if self.curve == Curve::P256 {
                    check_p256(&sec1, d)?;
                } else {
                    check_secp256k1(&sec1, d)?;
                }
            }
        }
        Ok(())
    }
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kty", self.key_type().as_str())?;
        map.serialize_entry("crv", self.curve.as_str())?;
        map.serialize_entry("x", &self.x)?;
        if let Some(y) = &self.y {
            map.serialize_entry("y", y)?;
        }
        if let Some(d) = &self.d {
            map.serialize_entry("d", d)?;
        }
        if let Some(kid) = &self.kid {
            map.serialize_entry("kid", kid)?;
        }
        for (name, value) in &self.extra {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.key_type())
            .field("crv", &self.curve)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("d", &self.d.as_ref().map(|_| "<redacted>"))
            .field("kid", &self.kid)
            .finish()
    }
}

impl Drop for Jwk {
    fn drop(&mut self) {
        if let Some(d) = self.d.as_mut() {
            d.zeroize();
        }
    }
}

fn check_p256(sec1: &[u8], d: Option<&[u8]>) -> Result<(), CryptoError> {
    let public = p256::PublicKey::from_sec1_bytes(sec1)
        .map_err(|e| CryptoError::InvalidKey(format!("invalid P-256 point: {e}")))?;
    if let Some(d) = d {
        let secret = p256::SecretKey::from_slice(d)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid scalar: {e}")))?;
        if secret.public_key() != public {
            return Err(mismatched_private_key());
        }
    }
    Ok(())
}

fn check_secp256k1(sec1: &[u8], d: Option<&[u8]>) -> Result<(), CryptoError> {
    let public = k256::PublicKey::from_sec1_bytes(sec1)
        .map_err(|e| CryptoError::InvalidKey(format!("invalid secp256k1 point: {e}")))?;
    if let Some(d) = d {
        let secret = k256::SecretKey::from_slice(d)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid scalar: {e}")))?;
        if secret.public_key() != public {
            return Err(mismatched_private_key());
        }
    }
    Ok(())
}

fn mismatched_private_key() -> CryptoError {
    CryptoError::InvalidKey("private key does not match public key".into())
}

pub(crate) fn encode_member(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn decode_member(member: &'static str, value: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| CryptoError::InvalidKey(format!("member '{member}' is not base64url: {e}")))
}

fn fixed_len<const N: usize>(member: &'static str, bytes: &[u8]) -> Result<[u8; N], CryptoError> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        member,
        expected: N,
        actual: bytes.len(),
    })
}
