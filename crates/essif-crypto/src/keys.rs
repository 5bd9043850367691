use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::jwk::{encode_member, Curve, Jwk};

/// Key identifier of the form `<controller>#<32 hex chars>`.
pub fn new_key_id(controller: &str) -> String {
    format!("{}#{}", controller, Uuid::new_v4().simple())
}

/// Generate a fresh P-256 key pair as a private JWK.
pub fn generate_p256(kid: impl Into<String>) -> Result<Jwk, CryptoError> {
    let secret = p256::SecretKey::random(&mut OsRng);
    let point = secret.public_key().to_encoded_point(false);
    let d = Zeroizing::new(secret.to_bytes().to_vec());
    ec_jwk(Curve::P256, point.x(), point.y(), &d, kid.into())
}

/// Generate a fresh secp256k1 key pair as a private JWK.
pub fn generate_secp256k1(kid: impl Into<String>) -> Result<Jwk, CryptoError> {
    let secret = k256::SecretKey::random(&mut OsRng);
    let point = secret.public_key().to_encoded_point(false);
    let d = Zeroizing::new(secret.to_bytes().to_vec());
    ec_jwk(Curve::Secp256k1, point.x(), point.y(), &d, kid.into())
}

fn ec_jwk<X, Y>(
    curve: Curve,
    x: Option<&X>,
    y: Option<&Y>,
    d: &[u8],
    kid: String,
) -> Result<Jwk, CryptoError>
where
    X: AsRef<[u8]> + ?Sized,
    Y: AsRef<[u8]> + ?Sized,
{
    let x = x.ok_or_else(|| CryptoError::KeyGeneration("public key has no x coordinate".into()))?;
    let y = y.ok_or_else(|| CryptoError::KeyGeneration("public key has no y coordinate".into()))?;

    let jwk = Jwk::from_parts(
        curve,
        encode_member(x.as_ref()),
        Some(encode_member(y.as_ref())),
        Some(encode_member(d)),
        Some(kid),
    )?;
    tracing::debug!(kid = ?jwk.kid(), %curve, "generated key");
    Ok(jwk)
}
