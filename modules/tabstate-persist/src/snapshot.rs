//! Cache-safe projection of application state.

use tabstate_common::{AppState, CachedFeed, CachedState};

/// Reduce the full state tree to what belongs in the cache.
///
/// - `initialized` is dropped (`CachedState` has no such field).
/// - Only enabled tags are kept, in order.
/// - Posts are truncated to the first `page_size`.
/// - Bookmarks, `latest` and every other section are copied as-is.
///
/// The result owns all of its data; nothing aliases live state.
pub fn state_to_cache(state: &AppState, page_size: usize) -> CachedState {
    CachedState {
        feed: CachedFeed {
            tags: state
                .feed
                .tags
                .iter()
                .filter(|t| t.enabled)
                .cloned()
                .collect(),
            posts: state.feed.posts.iter().take(page_size).cloned().collect(),
            bookmarks: state.feed.bookmarks.clone(),
            latest: state.feed.latest,
        },
        ui: state.ui.clone(),
        user: state.user.clone(),
        other: state.other.clone(),
    }
}
