use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabstate_engine::{MutationCategory, MutationLike};

use crate::types::{CachedState, FeedFilter, Post, Profile, Publication, Tag};

/// Type name of the mutation that seeds state from the cache at startup.
pub const LOAD_FROM_CACHE: &str = "loadFromCache";

/// Marker for deliberate-clear mutations in host-defined mutation names.
pub const RESET_MARKER: &str = "reset";

/// The same marker starting a camelCase word, as in `userResetAll`.
///
/// The plain rule is a case-sensitive search for `reset` alone, which misses
/// camelCase names like `userReset`; this widens it to catch them.
const RESET_WORD: &str = "Reset";

/// Every state change the application store accepts.
///
/// Serialized adjacently tagged, e.g.
/// `{"type":"setShowDndMenu","payload":true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum AppMutation {
    // feed
    SetPublications(Vec<Publication>),
    SetTags(Vec<Tag>),
    SetTagEnabled { name: String, enabled: bool },
    SetPosts(Vec<Post>),
    AddPosts(Vec<Post>),
    SetBookmarks(Vec<Post>),
    ToggleBookmark { id: String, bookmarked: bool },
    SetLatest(DateTime<Utc>),
    SetFilter(Option<FeedFilter>),
    SetShowBookmarks(bool),
    SetLoading(bool),
    ResetFeed,

    // ui
    SetDndModeTime(Option<DateTime<Utc>>),
    SetShowDndMenu(bool),
    SetInsaneMode(bool),
    SetShowTopSites(bool),
    SetTheme(Option<String>),
    ResetUi,

    // user
    SetProfile(Option<Profile>),
    SetShowSettings(bool),
    UserResetAll,

    // lifecycle
    SetInitialized(bool),
    LoadFromCache(Box<CachedState>),

    /// Host-defined mutation. When `section` is set, `payload` replaces that
    /// top-level section of state.
    Custom {
        name: String,
        #[serde(default)]
        section: Option<String>,
        #[serde(default)]
        payload: Value,
    },
}

impl MutationLike for AppMutation {
    fn mutation_type(&self) -> &str {
        match self {
            AppMutation::SetPublications(_) => "setPublications",
            AppMutation::SetTags(_) => "setTags",
            AppMutation::SetTagEnabled { .. } => "setTagEnabled",
            AppMutation::SetPosts(_) => "setPosts",
            AppMutation::AddPosts(_) => "addPosts",
            AppMutation::SetBookmarks(_) => "setBookmarks",
            AppMutation::ToggleBookmark { .. } => "toggleBookmark",
            AppMutation::SetLatest(_) => "setLatest",
            AppMutation::SetFilter(_) => "setFilter",
            AppMutation::SetShowBookmarks(_) => "setShowBookmarks",
            AppMutation::SetLoading(_) => "setLoading",
            AppMutation::ResetFeed => "resetFeed",
            AppMutation::SetDndModeTime(_) => "setDndModeTime",
            AppMutation::SetShowDndMenu(_) => "setShowDndMenu",
            AppMutation::SetInsaneMode(_) => "setInsaneMode",
            AppMutation::SetShowTopSites(_) => "setShowTopSites",
            AppMutation::SetTheme(_) => "setTheme",
            AppMutation::ResetUi => "resetUi",
            AppMutation::SetProfile(_) => "setProfile",
            AppMutation::SetShowSettings(_) => "setShowSettings",
            AppMutation::UserResetAll => "userResetAll",
            AppMutation::SetInitialized(_) => "setInitialized",
            AppMutation::LoadFromCache(_) => LOAD_FROM_CACHE,
            AppMutation::Custom { name, .. } => name.as_str(),
        }
    }

    fn category(&self) -> MutationCategory {
        match self {
            AppMutation::LoadFromCache(_) => MutationCategory::RestoredFromCache,
            AppMutation::ResetFeed | AppMutation::ResetUi | AppMutation::UserResetAll => {
                MutationCategory::ResetLike
            }
            AppMutation::Custom { name, .. } => category_from_name(name),
            _ => MutationCategory::Cacheable,
        }
    }
}

/// Category for mutations known only by name.
///
/// Exact `loadFromCache` restores; any name containing `reset`, or `Reset`
/// as a camelCase word, is a clear. Everything else is cacheable. Matching is
/// case-sensitive otherwise: `RESET` is not a clear.
pub fn category_from_name(name: &str) -> MutationCategory {
    if name == LOAD_FROM_CACHE {
        MutationCategory::RestoredFromCache
    } else if name.contains(RESET_MARKER) || name.contains(RESET_WORD) {
        MutationCategory::ResetLike
    } else {
        MutationCategory::Cacheable
    }
}
