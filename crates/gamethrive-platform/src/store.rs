//! Durable key-value storage for identity and activity.
//!
//! The SDK persists three values between launches (see [`keys`]). Every
//! write is durable when the call returns — the process may be killed at
//! any moment after a suspend, and nothing after that point is
//! guaranteed to run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Names of the persisted keys.
pub mod keys {
    /// Backend-assigned player id (text).
    pub const PLAYER_ID: &str = "GameThrivePlayerId";
    /// Last known push channel address (text).
    pub const CHANNEL_ADDRESS: &str = "GameThriveChannelUri";
    /// Foreground seconds not yet reported (counter).
    pub const ACTIVE_TIME: &str = "GameThriveActiveTime";
}

/// A single stored value.
///
/// `#[serde(untagged)]` so the file store writes `"abc"` and `42`
/// rather than `{"Text":"abc"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Counter(u64),
    Text(String),
}

/// Durable storage for the SDK's persisted keys.
///
/// Implementations must make each `set`/`remove` durable before
/// returning. Callers serialize access themselves (the session holds its
/// state lock around every read-modify-write), so implementations only
/// need to be internally thread-safe, not transactional.
pub trait IdentityStore: Send + Sync + 'static {
    /// Reads the value at `key`, if any.
    fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError>;

    /// Writes `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: StoredValue) -> Result<(), StoreError>;

    /// Deletes `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Reads a text value.
    ///
    /// # Errors
    /// [`StoreError::TypeMismatch`] if the key holds a counter.
    fn text(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.get(key)? {
            None => Ok(None),
            Some(StoredValue::Text(s)) => Ok(Some(s)),
            Some(StoredValue::Counter(_)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "text",
            }),
        }
    }

    /// Reads a counter value.
    ///
    /// # Errors
    /// [`StoreError::TypeMismatch`] if the key holds text.
    fn counter(&self, key: &str) -> Result<Option<u64>, StoreError> {
        match self.get(key)? {
            None => Ok(None),
            Some(StoredValue::Counter(n)) => Ok(Some(n)),
            Some(StoredValue::Text(_)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "counter",
            }),
        }
    }
}

impl<S: IdentityStore + ?Sized> IdentityStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-memory store.
///
/// Clones share the same map, so handing a clone to a second SDK
/// instance simulates a process restart with durable storage intact.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, StoredValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        lock(&self.values).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.values).remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// A store backed by a single JSON file.
///
/// The whole map is rewritten on every change: write to a sibling temp
/// file, then rename over the original, so a crash mid-write leaves the
/// previous version intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, StoredValue>>,
}

impl JsonFileStore {
    /// Opens (or prepares to create) the store at `path`.
    ///
    /// A missing file is an empty store; the file is created on the
    /// first write.
    ///
    /// # Errors
    /// - [`StoreError::Io`] — the file exists but can't be read
    /// - [`StoreError::Corrupt`] — the file isn't a JSON object of values
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StoreError::Corrupt)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "identity store opened");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, StoredValue>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(values).map_err(StoreError::Corrupt)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl IdentityStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        let mut values = lock(&self.values);
        values.insert(key.to_string(), value);
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = lock(&self.values);
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
