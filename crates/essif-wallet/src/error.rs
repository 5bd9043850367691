use std::path::PathBuf;

/// Wallet storage errors.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("invalid key: store keys must not be empty")]
    InvalidKey,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("failed to parse stored bucket: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid bucket: {0}")]
    InvalidBucket(String),

    #[error("corrupted bucket: requested '{requested}' but stored record holds '{found}'")]
    Corruption { requested: String, found: String },

    #[error("malformed store entry for '{key}': {reason}")]
    MalformedEntry { key: String, reason: String },

    #[error("failed to open wallet store at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rocksdb::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rocksdb::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WalletError {
    /// Whether the error means "nothing stored under this key".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
