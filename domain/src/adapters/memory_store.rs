use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{CoreError, KvStore};

/// Simple in-memory key-value store for tests and demos. Data lives only as
/// long as the value; the mutex only guards individual get/put calls.
pub struct InMemoryStore {
    inner: Mutex<BTreeMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of keys currently held.
    pub fn len(&self) -> Result<usize, CoreError> {
        let map = self
            .inner
            .lock()
            .map_err(|_| CoreError::StoreUnavailable("mutex poisoned".into()))?;
        Ok(map.len())
    }

    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let map = self
            .inner
            .lock()
            .map_err(|_| CoreError::StoreUnavailable("mutex poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), CoreError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| CoreError::StoreUnavailable("mutex poisoned".into()))?;
        map.insert(key.to_string(), value);
        Ok(())
    }
}
