//! The application reducer: every `AppMutation` applied to `AppState`.

use tabstate_engine::Reducer;
use tracing::debug;

use crate::mutation::AppMutation;
use crate::types::{AppState, CachedState, Post};

/// Top-level keys modelled by `AppState` itself. Host sections may not use them.
pub const RESERVED_SECTIONS: [&str; 4] = ["initialized", "feed", "ui", "user"];

pub struct AppReducer;

impl Reducer<AppMutation, AppState> for AppReducer {
    fn reduce(&self, state: &mut AppState, mutation: &AppMutation) {
        match mutation {
            // --- feed ---
            AppMutation::SetPublications(publications) => {
                state.feed.publications = publications.clone();
            }
            AppMutation::SetTags(tags) => {
                state.feed.tags = tags.clone();
            }
            AppMutation::SetTagEnabled { name, enabled } => {
                if let Some(tag) = state.feed.tags.iter_mut().find(|t| &t.name == name) {
                    tag.enabled = *enabled;
                }
            }
            AppMutation::SetPosts(posts) => {
                state.feed.posts = posts.clone();
            }
            AppMutation::AddPosts(posts) => {
                for post in posts {
                    if !state.feed.posts.iter().any(|p| p.id == post.id) {
                        state.feed.posts.push(post.clone());
                    }
                }
            }
            AppMutation::SetBookmarks(bookmarks) => {
                state.feed.bookmarks = bookmarks.clone();
            }
            AppMutation::ToggleBookmark { id, bookmarked } => {
                toggle_bookmark(state, id, *bookmarked);
            }
            AppMutation::SetLatest(latest) => {
                state.feed.latest = Some(*latest);
            }
            AppMutation::SetFilter(filter) => {
                state.feed.filter = filter.clone();
            }
            AppMutation::SetShowBookmarks(show) => {
                state.feed.show_bookmarks = *show;
            }
            AppMutation::SetLoading(loading) => {
                state.feed.loading = *loading;
            }
            AppMutation::ResetFeed => {
                state.feed.posts.clear();
                state.feed.latest = None;
                state.feed.filter = None;
                state.feed.show_bookmarks = false;
                state.feed.loading = false;
            }

            // --- ui ---
            AppMutation::SetDndModeTime(until) => {
                state.ui.dnd_mode_time = *until;
            }
            AppMutation::SetShowDndMenu(show) => {
                state.ui.show_dnd_menu = *show;
            }
            AppMutation::SetInsaneMode(on) => {
                state.ui.insane_mode = *on;
            }
            AppMutation::SetShowTopSites(show) => {
                state.ui.show_top_sites = *show;
            }
            AppMutation::SetTheme(theme) => {
                state.ui.theme = theme.clone();
            }
            AppMutation::ResetUi => {
                state.ui = Default::default();
            }

            // --- user ---
            AppMutation::SetProfile(profile) => {
                state.user.profile = profile.clone();
            }
            AppMutation::SetShowSettings(show) => {
                state.user.show_settings = *show;
            }
            AppMutation::UserResetAll => {
                state.user = Default::default();
                state.feed.bookmarks.clear();
                for post in &mut state.feed.posts {
                    post.bookmarked = false;
                }
            }

            // --- lifecycle ---
            AppMutation::SetInitialized(initialized) => {
                state.initialized = *initialized;
            }
            AppMutation::LoadFromCache(cached) => {
                load_from_cache(state, cached);
            }
            AppMutation::Custom {
                name,
                section,
                payload,
            } => match section.as_deref() {
                Some(key) if RESERVED_SECTIONS.contains(&key) => {
                    debug!(mutation = name.as_str(), section = key, "Ignoring reserved section");
                }
                Some(key) => {
                    state.other.insert(key.to_string(), payload.clone());
                }
                None => {}
            },
        }
    }
}

fn toggle_bookmark(state: &mut AppState, id: &str, bookmarked: bool) {
    let mut found: Option<Post> = None;
    for post in &mut state.feed.posts {
        if post.id == id {
            post.bookmarked = bookmarked;
            found = Some(post.clone());
        }
    }

    if bookmarked {
        if let Some(post) = found {
            if !state.feed.bookmarks.iter().any(|b| b.id == id) {
                state.feed.bookmarks.insert(0, post);
            }
        }
    } else {
        state.feed.bookmarks.retain(|b| b.id != id);
    }
}

fn load_from_cache(state: &mut AppState, cached: &CachedState) {
    state.feed.tags = cached.feed.tags.clone();
    state.feed.posts = cached.feed.posts.clone();
    state.feed.bookmarks = cached.feed.bookmarks.clone();
    state.feed.latest = cached.feed.latest;
    state.ui = cached.ui.clone();
    state.user = cached.user.clone();
    for (key, value) in &cached.other {
        if RESERVED_SECTIONS.contains(&key.as_str()) {
            continue;
        }
        state.other.insert(key.clone(), value.clone());
    }
    state.initialized = true;
}
