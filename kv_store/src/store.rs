use std::{collections::HashMap, sync::RwLock};

use bytes::Bytes;
use regex::Regex;

use crate::{StoreError, StoreResult};

/// A byte-valued key-value store.
///
/// `remove_by_regex` removes every key the pattern matches anywhere in the key, so `p2d` and
/// `.*p2d.*` select the same keys.
pub trait KvStore: Send + Sync {
    fn put(&self, key: &str, value: Bytes) -> StoreResult<()>;

    fn get(&self, key: &str) -> StoreResult<Option<Bytes>>;

    /// Returns whether the key was present
    fn remove(&self, key: &str) -> StoreResult<bool>;

    /// Returns the number of keys removed
    fn remove_by_regex(&self, pattern: &str) -> StoreResult<usize>;
}

/// In-process store, shared by reference between threads
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.read().map_err(|_| StoreError::Poisoned)?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }
}

impl KvStore for MemoryStore {
    fn put(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    fn remove_by_regex(&self, pattern: &str) -> StoreResult<usize> {
        let regex = Regex::new(pattern)?;
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let before = entries.len();
        entries.retain(|key, _| !regex.is_match(key));
        Ok(before - entries.len())
    }
}
