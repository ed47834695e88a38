//! Integration tests: store + cache plugin + writer.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tabstate_cache::{CacheStore, MemoryCache};
use tabstate_common::{
    AppMutation, AppReducer, AppState, CachedState, PersistConfig, Post, Result, TabStateError,
    Tag,
};
use tabstate_engine::Store;
use tabstate_persist::persistence;

// ---------------------------------------------------------------------------
// Test caches
// ---------------------------------------------------------------------------

/// Rejects every write, like a cache over quota.
#[derive(Default)]
struct FailingCache {
    attempts: AtomicU64,
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TabStateError::CacheWrite("quota exceeded".into()))
    }
}

/// Records every write in completion order, after a delay.
#[derive(Default)]
struct SlowRecordingCache {
    history: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl CacheStore for SlowRecordingCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let history = self.history.lock().unwrap();
        Ok(history
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.history.lock().unwrap().push((key.to_string(), value));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn posts(n: usize) -> Vec<Post> {
    (0..n)
        .map(|i| Post::new(format!("p{i}"), format!("Post {i}"), format!("https://x/{i}")))
        .collect()
}

fn custom(name: &str) -> AppMutation {
    AppMutation::Custom {
        name: name.to_string(),
        section: None,
        payload: Value::Null,
    }
}

fn cached_from(cache: &MemoryCache, key: &str) -> CachedState {
    serde_json::from_value(cache.peek(key).expect("entry should exist")).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn qualifying_mutation_writes_reduced_snapshot() {
    let cache = Arc::new(MemoryCache::new());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    store.commit(AppMutation::SetTags(vec![
        Tag::new("a", true),
        Tag::new("b", false),
    ]));
    store.commit(AppMutation::SetPosts(posts(30)));

    let stats = writer.shutdown().await;
    assert_eq!(stats.written(), 2);
    assert_eq!(cache.write_count(), 2);

    let cached = cached_from(&cache, "state");
    assert_eq!(cached.feed.tags, vec![Tag::new("a", true)]);
    assert_eq!(cached.feed.posts.len(), 20);
    assert_eq!(cached.feed.posts[..], posts(30)[..20]);
}

#[tokio::test]
async fn one_write_per_cacheable_mutation() {
    let cache = Arc::new(MemoryCache::new());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    store.commit(AppMutation::SetPublications(vec![]));
    store.commit(AppMutation::SetDndModeTime(Some(chrono::Utc::now())));
    store.commit(AppMutation::SetShowDndMenu(true));

    writer.shutdown().await;
    assert_eq!(cache.write_count(), 3);
}

#[tokio::test]
async fn load_from_cache_is_never_written_back() {
    let cache = Arc::new(MemoryCache::new());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    store.commit(AppMutation::LoadFromCache(Box::default()));
    store.commit(custom("loadFromCache"));

    let stats = writer.shutdown().await;
    assert_eq!(stats.written(), 0);
    assert_eq!(cache.write_count(), 0);
    assert!(store.state().initialized);
}

#[tokio::test]
async fn reset_mutations_are_never_written() {
    let cache = Arc::new(MemoryCache::new());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    store.commit(AppMutation::ResetFeed);
    store.commit(AppMutation::ResetUi);
    store.commit(AppMutation::UserResetAll);
    store.commit(custom("userResetAll"));
    store.commit(custom("userReset"));
    store.commit(custom("feed/reset"));

    writer.shutdown().await;
    assert_eq!(cache.write_count(), 0);
    assert_eq!(store.commit_count(), 6);
}

#[tokio::test]
async fn reset_after_write_leaves_previous_snapshot() {
    let cache = Arc::new(MemoryCache::new());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    store.commit(AppMutation::SetPosts(posts(3)));
    store.commit(AppMutation::ResetFeed);

    writer.shutdown().await;
    assert!(store.state().feed.posts.is_empty());
    assert_eq!(cached_from(&cache, "state").feed.posts.len(), 3);
}

/// Collects formatted log output so a test can assert on it.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn write_failure_is_logged_once_not_raised() {
    let logs = CapturedLogs::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    // Current-thread runtime: the writer task is polled on this thread.
    let _guard = tracing::subscriber::set_default(subscriber);

    let cache = Arc::new(FailingCache::default());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    let state = store.commit(AppMutation::SetShowDndMenu(true));
    assert!(state.ui.show_dnd_menu);

    let stats = writer.shutdown().await;
    assert_eq!(stats.failed(), 1);
    assert_eq!(stats.written(), 0);
    // No retry
    assert_eq!(cache.attempts.load(Ordering::SeqCst), 1);

    let text = logs.text();
    assert_eq!(text.matches("failed to cache state").count(), 1, "{text}");
    assert!(text.contains("quota exceeded"), "{text}");
    assert!(text.contains("WARN"), "{text}");
}

#[tokio::test]
async fn unusable_cache_key_is_rejected_before_spawning() {
    let cache = Arc::new(MemoryCache::new());
    let config = PersistConfig::default().with_cache_key("new tab");

    assert!(matches!(
        persistence(Arc::clone(&cache), &config),
        Err(TabStateError::Config(_))
    ));
    assert_eq!(cache.write_count(), 0);
}

#[tokio::test]
async fn commit_does_not_wait_for_writes() {
    let cache = Arc::new(SlowRecordingCache::default());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    for i in 1..=5 {
        store.commit(AppMutation::SetPosts(posts(i)));
    }
    // The writer has not been polled yet: every commit returned first.
    assert!(cache.history.lock().unwrap().is_empty());

    writer.shutdown().await;
    let history = cache.history.lock().unwrap();
    assert_eq!(history.len(), 5);
}

#[tokio::test]
async fn writes_complete_in_issue_order() {
    let cache = Arc::new(SlowRecordingCache::default());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    for i in 1..=4 {
        store.commit(AppMutation::SetPosts(posts(i)));
    }

    writer.shutdown().await;
    let lengths: Vec<usize> = cache
        .history
        .lock()
        .unwrap()
        .iter()
        .map(|(_, v)| v["feed"]["posts"].as_array().map_or(0, Vec::len))
        .collect();
    assert_eq!(lengths, vec![1, 2, 3, 4]);

    let last = cache.get("state").await.unwrap().unwrap();
    assert_eq!(last["feed"]["posts"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn snapshot_reflects_state_at_commit_time() {
    let cache = Arc::new(SlowRecordingCache::default());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    store.commit(AppMutation::SetTheme(Some("dark".into())));
    // Not cached, but changes live state before the first write lands
    store.commit(AppMutation::ResetUi);

    writer.shutdown().await;
    let history = cache.history.lock().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].1["ui"]["theme"], json!("dark"));
}

#[tokio::test]
async fn custom_key_and_page_size_are_honoured() {
    let cache = Arc::new(MemoryCache::new());
    let config = PersistConfig::default()
        .with_cache_key("newtab")
        .with_page_size(5);
    let (plugin, writer) = persistence(Arc::clone(&cache), &config).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    store.commit(AppMutation::SetPosts(posts(12)));

    writer.shutdown().await;
    assert!(cache.peek("state").is_none());
    assert_eq!(cached_from(&cache, "newtab").feed.posts.len(), 5);
}

#[tokio::test]
async fn initialized_flag_never_reaches_cache() {
    let cache = Arc::new(MemoryCache::new());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    store.commit(AppMutation::SetInitialized(true));

    writer.shutdown().await;
    let entry = cache.peek("state").unwrap();
    assert!(entry.get("initialized").is_none());
    assert!(entry.get("feed").is_some());
}

#[tokio::test]
async fn commits_after_shutdown_are_dropped_quietly() {
    let cache = Arc::new(MemoryCache::new());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    writer.shutdown().await;
    let state = store.commit(AppMutation::SetInsaneMode(true));

    assert!(state.ui.insane_mode);
    assert_eq!(cache.write_count(), 0);
}

#[tokio::test]
async fn writer_outlives_dropped_handle() {
    let cache = Arc::new(MemoryCache::new());
    let (plugin, writer) = persistence(Arc::clone(&cache), &PersistConfig::default()).unwrap();
    drop(writer);

    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);
    store.commit(AppMutation::SetInsaneMode(true));

    for _ in 0..100 {
        if cache.write_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(cache.write_count(), 1);
}
