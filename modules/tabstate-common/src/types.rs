use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Feed ---

/// A content tag the user can follow or mute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub enabled: bool,
}

impl Tag {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
        }
    }
}

/// A content source shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub publication: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub bookmarked: bool,
}

impl Post {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            image: None,
            publication: None,
            published_at: None,
            tags: Vec::new(),
            bookmarked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    Publication,
    Tag,
}

/// Narrows the feed to a single publication or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilter {
    pub kind: FilterKind,
    pub id: String,
}

/// The feed section. `publications`, `filter`, `show_bookmarks` and
/// `loading` are session-only and never reach the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub bookmarks: Vec<Post>,
    #[serde(default)]
    pub latest: Option<DateTime<Utc>>,
    #[serde(default)]
    pub show_bookmarks: bool,
    #[serde(default)]
    pub filter: Option<FeedFilter>,
    #[serde(default)]
    pub loading: bool,
}

// --- UI ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(default)]
    pub insane_mode: bool,
    #[serde(default)]
    pub show_dnd_menu: bool,
    /// Do-not-disturb is active until this instant.
    #[serde(default)]
    pub dnd_mode_time: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub show_top_sites: bool,
    #[serde(default)]
    pub theme: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            insane_mode: false,
            show_dnd_menu: false,
            dnd_mode_time: None,
            show_top_sites: true,
            theme: None,
        }
    }
}

fn default_true() -> bool {
    true
}

// --- User ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub show_settings: bool,
}

// --- Whole tree ---

/// The complete application state tree, owned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Set once startup loading finishes. Never cached.
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub feed: FeedState,
    #[serde(default)]
    pub ui: UiState,
    #[serde(default)]
    pub user: UserState,
    /// Top-level sections owned by host code rather than this crate.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

// --- Cache projection ---

/// The feed as it is stored in the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedFeed {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub bookmarks: Vec<Post>,
    #[serde(default)]
    pub latest: Option<DateTime<Utc>>,
}

/// The persisted cache entry. Deliberately has no `initialized` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedState {
    #[serde(default)]
    pub feed: CachedFeed,
    #[serde(default)]
    pub ui: UiState,
    #[serde(default)]
    pub user: UserState,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}
