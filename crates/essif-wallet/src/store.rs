//! Transactional embedded key-value store backed by a RocksDB `TransactionDB`.
//!
//! Every mutation runs in its own write transaction and commits
//! all-or-nothing; writers on the same key serialize on the transaction
//! lock. Reads go through a snapshot, so a reader sees one consistent view
//! no matter what concurrent writers commit in the meantime.
//!
//! Values are wrapped in a small envelope holding the expiry instant, so
//! TTL handling stays invisible to callers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rocksdb::{
    DBIteratorWithThreadMode, IteratorMode, Options, TransactionDB, TransactionDBOptions,
};

use crate::clock::{Clock, SystemClock};
use crate::error::WalletError;

/// Location of the wallet when no path is configured.
pub const DEFAULT_STORE_PATH: &str = "walletdata.db";

/// Extra lifetime added to every expiring entry to absorb write and
/// processing latency.
pub const EXPIRY_GRACE: Duration = Duration::from_secs(5);

/// TTL value meaning "never expires".
pub const NO_EXPIRY: Duration = Duration::ZERO;

/// Envelope header: big-endian unix milliseconds, 0 = never expires.
const HEADER_LEN: usize = 8;

/// Embedded transactional key-value store.
pub struct KeyValueStore {
    db: TransactionDB,
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl KeyValueStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    /// Open or create a store at [`DEFAULT_STORE_PATH`].
    pub fn open_default() -> Result<Self, WalletError> {
        Self::open(DEFAULT_STORE_PATH)
    }

    /// Open or create a store whose expiry checks read the given clock.
    pub fn open_with_clock(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WalletError> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        let txn_db_opts = TransactionDBOptions::default();

        let db = TransactionDB::open(&opts, &txn_db_opts, path).map_err(|source| {
            WalletError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!(path = %path.display(), "wallet store opened");
        Ok(Self {
            db,
            path: path.to_path_buf(),
            clock,
        })
    }

    /// Directory the store lives in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `value` under `key`, replacing any previous value in full.
    ///
    /// A non-zero `ttl` makes the entry unreadable once `ttl` plus
    /// [`EXPIRY_GRACE`] has elapsed; [`NO_EXPIRY`] keeps it forever.
    pub fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), WalletError> {
        if is_blank(key) {
            return Err(WalletError::InvalidKey);
        }

        let expires_at = self.expires_at(ttl);
        let txn = self.db.transaction();
        txn.put(key.as_bytes(), encode_entry(expires_at, value))?;
        txn.commit()?;

        tracing::debug!(key, expires_at, bytes = value.len(), "store entry written");
        Ok(())
    }

    /// Write `value` under `key` only if no live entry is stored there.
    ///
    /// The existence check and the write share one transaction holding the
    /// key lock, so of several concurrent inserts of the same key exactly
    /// one succeeds. An expired entry counts as absent.
    pub fn insert(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), WalletError> {
        if is_blank(key) {
            return Err(WalletError::InvalidKey);
        }

        let txn = self.db.transaction();
        if let Some(raw) = txn.get_for_update(key.as_bytes(), true)? {
            let (expires_at, _) = decode_entry(key, &raw)?;
            if !is_expired(expires_at, self.now_millis()) {
                return Err(WalletError::AlreadyExists(key.to_string()));
            }
        }

        let expires_at = self.expires_at(ttl);
        txn.put(key.as_bytes(), encode_entry(expires_at, value))?;
        txn.commit()?;

        tracing::debug!(key, expires_at, bytes = value.len(), "store entry inserted");
        Ok(())
    }

    /// Read the value under `key`.
    pub fn get(&self, key: &str) -> Result<Vec<u8>, WalletError> {
        if is_blank(key) {
            return Err(WalletError::NotFound(key.to_string()));
        }

        let snapshot = self.db.snapshot();
        let raw = snapshot
            .get(key.as_bytes())?
            .ok_or_else(|| WalletError::NotFound(key.to_string()))?;

        let (expires_at, payload) = decode_entry(key, &raw)?;
        if is_expired(expires_at, self.now_millis()) {
            tracing::debug!(key, expires_at, "store entry expired");
            return Err(WalletError::NotFound(key.to_string()));
        }
        Ok(payload.to_vec())
    }

    /// Remove the entry under `key`.
    pub fn delete(&self, key: &str) -> Result<(), WalletError> {
        if is_blank(key) {
            return Err(WalletError::NotFound(key.to_string()));
        }

        let txn = self.db.transaction();
        let raw = txn
            .get_for_update(key.as_bytes(), true)?
            .ok_or_else(|| WalletError::NotFound(key.to_string()))?;
        let (expires_at, _) = decode_entry(key, &raw)?;
        if is_expired(expires_at, self.now_millis()) {
            return Err(WalletError::NotFound(key.to_string()));
        }

        txn.delete(key.as_bytes())?;
        txn.commit()?;

        tracing::debug!(key, "store entry deleted");
        Ok(())
    }

    /// Lazily enumerate every key that has not expired, in index order.
    ///
    /// The iterator reads from a point-in-time view taken when it is
    /// created. Call again to restart.
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            inner: self.db.iterator(IteratorMode::Start),
            now: self.now_millis(),
        }
    }

    /// Release the underlying database handle.
    pub fn close(self) {
        tracing::debug!(path = %self.path.display(), "wallet store closed");
        drop(self);
    }

    #[cfg(test)]
    pub(crate) fn db_for_tests(&self) -> &TransactionDB {
        &self.db
    }

    fn expires_at(&self, ttl: Duration) -> u64 {
        if ttl.is_zero() {
            return 0;
        }
        let lifetime = u64::try_from((ttl + EXPIRY_GRACE).as_millis()).unwrap_or(u64::MAX);
        self.now_millis().saturating_add(lifetime)
    }

    fn now_millis(&self) -> u64 {
        u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0)
    }
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Iterator over the live keys of a [`KeyValueStore`].
pub struct Keys<'a> {
    inner: DBIteratorWithThreadMode<'a, TransactionDB>,
    now: u64,
}

impl Iterator for Keys<'_> {
    type Item = Result<String, WalletError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, value) = match self.inner.next()? {
                Ok(kv) => kv,
                Err(e) => return Some(Err(e.into())),
            };
            let key = match String::from_utf8(key.into_vec()) {
                Ok(key) => key,
                Err(e) => {
                    return Some(Err(WalletError::MalformedEntry {
                        key: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                        reason: "key is not valid UTF-8".into(),
                    }))
                }
            };
            match decode_entry(&key, &value) {
                Ok((expires_at, _)) if is_expired(expires_at, self.now) => continue,
                Ok(_) => return Some(Ok(key)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn is_blank(key: &str) -> bool {
    key.trim().is_empty()
}

fn is_expired(expires_at: u64, now: u64) -> bool {
    expires_at != 0 && now >= expires_at
}

fn encode_entry(expires_at: u64, payload: &[u8]) -> Vec<u8> {
    let mut entry = Vec::with_capacity(HEADER_LEN + payload.len());
    entry.extend_from_slice(&expires_at.to_be_bytes());
    entry.extend_from_slice(payload);
    entry
}

fn decode_entry<'a>(key: &str, raw: &'a [u8]) -> Result<(u64, &'a [u8]), WalletError> {
    if raw.len() < HEADER_LEN {
        return Err(WalletError::MalformedEntry {
            key: key.to_string(),
            reason: format!("entry is {} bytes, shorter than its header", raw.len()),
        });
    }
    let (header, payload) = raw.split_at(HEADER_LEN);
    let mut expires_at = [0u8; HEADER_LEN];
    expires_at.copy_from_slice(header);
    Ok((u64::from_be_bytes(expires_at), payload))
}
