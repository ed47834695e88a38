use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tabstate_common::Result;

/// Asynchronous key-value cache.
///
/// Implemented by `FileCache` (on disk) and `MemoryCache` (tests and
/// ephemeral sessions). Also implemented for `Arc<C>` so a cache can be
/// shared between the writer task and test assertions.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the entry stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the entry stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

#[async_trait]
impl<C: CacheStore + ?Sized> CacheStore for Arc<C> {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value).await
    }
}
