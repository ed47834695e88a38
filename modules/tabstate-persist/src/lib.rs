//! Cache persistence for the application store.
//!
//! `CachePlugin` subscribes to the store and, after every cacheable mutation,
//! reduces state to a `CachedState` and queues it. `CacheWriter` drains the
//! queue on its own task and writes each snapshot under one well-known key.
//! Failed writes are logged and dropped; the commit path never waits on or
//! hears about the cache.
//!
//! ```text
//! commit ─► reducer ─► CachePlugin ──(mpsc)──► CacheWriter ─► CacheStore::set
//!                       │ skip: loadFromCache, resets
//!                       └ state_to_cache(state, page_size)
//! ```

pub mod plugin;
pub mod restore;
pub mod snapshot;
pub mod writer;

pub use plugin::CachePlugin;
pub use restore::{load_cached_state, restore_into, restore_mutation};
pub use snapshot::state_to_cache;
pub use writer::{CacheWriter, PersistTask, WriterHandle, WriterStats};

use tabstate_cache::CacheStore;
use tabstate_common::{PersistConfig, Result};
use tokio::sync::mpsc;

/// Wire a plugin to a freshly spawned writer. Must run inside a tokio runtime.
/// Returns `TabStateError::Config` if `config` does not validate.
pub fn persistence<C>(cache: C, config: &PersistConfig) -> Result<(CachePlugin, WriterHandle)>
where
    C: CacheStore + 'static,
{
    config.validate()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let plugin = CachePlugin::new(config.cache_key.clone(), config.page_size, tx);
    let writer = CacheWriter::spawn(cache, rx);
    Ok((plugin, writer))
}
