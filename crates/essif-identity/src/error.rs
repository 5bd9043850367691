use essif_wallet::BucketState;

/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("duplicate DID: {0}")]
    DuplicateDid(String),

    #[error("DID not found: {0}")]
    DidNotFound(String),

    #[error("DID {did} is {state}, expected {expected}")]
    InvalidState {
        did: String,
        state: BucketState,
        expected: BucketState,
    },

    #[error("bucket for {did} is missing '{field}'")]
    MissingField { did: String, field: &'static str },

    #[error("trust list error: {0}")]
    TrustList(String),

    #[error("wallet error: {0}")]
    Wallet(#[from] essif_wallet::WalletError),

    #[error("crypto error: {0}")]
    Crypto(#[from] essif_crypto::CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
