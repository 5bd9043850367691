/// Cryptographic key errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("unsupported key type '{kty}' with curve '{crv}'")]
    UnsupportedKey { kty: String, crv: String },

    #[error("invalid key length for '{member}': expected {expected}, got {actual}")]
    InvalidKeyLength {
        member: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}
