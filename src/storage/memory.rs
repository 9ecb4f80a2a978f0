use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::AppResult;

use super::TokenStore;

/// Token store that never touches disk. Used for `--ephemeral` sessions and tests.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { map: RwLock::new(map) }
    }

    pub fn keys(&self) -> Vec<String> { self.map.read().keys().cloned().collect() }
}

impl TokenStore for MemoryStore {
    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.map.write().remove(key);
        Ok(())
    }
}
