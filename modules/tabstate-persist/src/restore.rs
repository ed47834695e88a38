//! Seeding state from the cache at startup.

use tabstate_cache::CacheStore;
use tabstate_common::{AppMutation, AppState, CachedState, Result, TabStateError};
use tabstate_engine::{Reducer, Store};
use tracing::{info, warn};

/// Read the persisted snapshot under `key`.
///
/// A missing entry is `None`. So is a corrupt one, with a warning: a stale or
/// unreadable cache must never keep the app from starting.
pub async fn load_cached_state<C>(cache: &C, key: &str) -> Result<Option<CachedState>>
where
    C: CacheStore + ?Sized,
{
    let value = match cache.get(key).await {
        Ok(Some(value)) => value,
        Ok(None) => return Ok(None),
        Err(TabStateError::Serialization(e)) => {
            warn!(error = %e, key, "Cached state unreadable, ignoring");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    match serde_json::from_value::<CachedState>(value) {
        Ok(cached) => Ok(Some(cached)),
        Err(e) => {
            warn!(error = %e, key, "Cached state has unexpected shape, ignoring");
            Ok(None)
        }
    }
}

/// The `loadFromCache` mutation for the snapshot under `key`, if there is one.
pub async fn restore_mutation<C>(cache: &C, key: &str) -> Result<Option<AppMutation>>
where
    C: CacheStore + ?Sized,
{
    Ok(load_cached_state(cache, key)
        .await?
        .map(|cached| AppMutation::LoadFromCache(Box::new(cached))))
}

/// Commit the cached snapshot into `store`. Returns whether anything was found.
///
/// `loadFromCache` is never cacheable, so this does not write back.
pub async fn restore_into<C, Red>(
    store: &mut Store<AppMutation, AppState, Red>,
    cache: &C,
    key: &str,
) -> Result<bool>
where
    C: CacheStore + ?Sized,
    Red: Reducer<AppMutation, AppState>,
{
    match restore_mutation(cache, key).await? {
        Some(mutation) => {
            let state = store.commit(mutation);
            info!(
                key,
                posts = state.feed.posts.len(),
                tags = state.feed.tags.len(),
                bookmarks = state.feed.bookmarks.len(),
                "State restored from cache"
            );
            Ok(true)
        }
        None => {
            info!(key, "No cached state");
            Ok(false)
        }
    }
}
