use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tabstate_common::{Result, TabStateError};

use crate::traits::CacheStore;

/// In-memory cache. Thread-safe. Counts writes for test assertions.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Value>>,
    writes: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the entry under `key` without going through the async API.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| TabStateError::CacheRead("memory cache lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| TabStateError::CacheWrite("memory cache lock poisoned".into()))?;
        entries.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
