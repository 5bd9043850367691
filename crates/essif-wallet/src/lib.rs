//! essif Wallet — local persistent storage for the keys, documents and
//! tokens produced while provisioning a decentralized identifier.
//!
//! - [`KeyValueStore`]: transactional embedded store with per-entry expiry
//! - [`codec`]: sparse JSON encoding of a [`DidBucket`]
//! - [`WalletRepository`]: DID-keyed bucket access

pub mod bucket;
pub mod clock;
pub mod codec;
pub mod error;
pub mod repository;
pub mod store;

pub use bucket::{BucketState, DidBucket, Document};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::WalletError;
pub use repository::WalletRepository;
pub use store::{KeyValueStore, Keys, DEFAULT_STORE_PATH, EXPIRY_GRACE, NO_EXPIRY};
