//! Key-value persistence contract.
//!
//! Everything the practice core persists is a whole JSON value stored under
//! a named key. Reads never fail the caller: missing or corrupt data falls
//! back to the type's default. Writes log failures instead of propagating.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StorageError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Load `key` as `T`, or `T::default()` if it is missing, unreadable or corrupt.
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored value; using defaults");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Stored value is corrupt; using defaults");
            T::default()
        }
    }
}

/// Write `value` under `key`. Returns false if the write did not happen.
///
/// A value that fails to serialize is replaced by an empty payload so the
/// next load falls back to defaults instead of reading stale data.
pub fn persist<T, S>(store: &S, key: &str, value: &T) -> bool
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(key, error = %e, "Failed to serialize value; writing empty payload");
            String::new()
        }
    };
    match store.set(key, &payload) {
        Ok(()) => !payload.is_empty(),
        Err(e) => {
            warn!(key, error = %e, "Failed to persist value");
            false
        }
    }
}
