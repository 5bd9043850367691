//! essif Crypto — JSON Web Key model and key generation for the
//! keys held in an essif wallet.
//!
//! Issuance and presentation keys are P-256; admin keys used against a
//! trust list are secp256k1.

pub mod error;
pub mod jwk;
pub mod keys;

pub use error::CryptoError;
pub use jwk::{Curve, Jwk, KeyType};
pub use keys::{generate_p256, generate_secp256k1, new_key_id};
