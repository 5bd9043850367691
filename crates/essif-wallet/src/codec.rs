//! Bucket codec: the sparse JSON form a [`DidBucket`] is persisted as.
//!
//! Recognized members are `did`, `issKey`, `presKey`, `encKey`, `txnKey`,
//! `sigKey`, `doc` and `token`. Only `did` is mandatory. Key members are
//! nested JWK objects, `doc` is a nested object, the rest are strings.

use crate::bucket::DidBucket;
use crate::error::WalletError;

/// Serialize a bucket, omitting every absent field.
pub fn encode(bucket: &DidBucket) -> Result<Vec<u8>, WalletError> {
    if bucket.did.trim().is_empty() {
        return Err(WalletError::InvalidBucket("bucket has an empty DID".into()));
    }
    Ok(serde_json::to_vec(bucket)?)
}

/// Parse a persisted bucket. Members missing from the input decode as absent.
pub fn decode(bytes: &[u8]) -> Result<DidBucket, WalletError> {
    let bucket: DidBucket = serde_json::from_slice(bytes)?;
    if bucket.did.trim().is_empty() {
        return Err(WalletError::InvalidBucket(
            "stored bucket has an empty DID".into(),
        ));
    }
    Ok(bucket)
}
