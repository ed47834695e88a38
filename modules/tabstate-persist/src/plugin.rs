//! Store subscriber that snapshots state into the cache.

use std::sync::atomic::{AtomicU64, Ordering};

use tabstate_common::AppState;
use tabstate_engine::{MutationLike, Subscriber};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::snapshot::state_to_cache;
use crate::writer::PersistTask;

/// Persists a reduced snapshot after every cacheable mutation.
///
/// Runs inside the commit path, so it only reduces and enqueues. The write
/// itself happens on the `CacheWriter` task; this side never waits for it and
/// never learns whether it failed.
pub struct CachePlugin {
    key: String,
    page_size: usize,
    tasks: mpsc::UnboundedSender<PersistTask>,
    issued: AtomicU64,
}

impl CachePlugin {
    pub fn new(
        key: impl Into<String>,
        page_size: usize,
        tasks: mpsc::UnboundedSender<PersistTask>,
    ) -> Self {
        Self {
            key: key.into(),
            page_size,
            tasks,
            issued: AtomicU64::new(0),
        }
    }
}

impl<M: MutationLike> Subscriber<M, AppState> for CachePlugin {
    fn on_commit(&self, mutation: &M, state: &AppState) {
        let category = mutation.category();
        if !category.is_cacheable() {
            debug!(
                mutation = mutation.mutation_type(),
                ?category,
                "Skipping cache write"
            );
            return;
        }

        let snapshot = state_to_cache(state, self.page_size);
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let task = PersistTask {
            key: self.key.clone(),
            snapshot,
            seq,
        };

        if self.tasks.send(task).is_err() {
            warn!(
                mutation = mutation.mutation_type(),
                seq,
                "Cache writer stopped, snapshot dropped"
            );
            return;
        }

        debug!(mutation = mutation.mutation_type(), seq, "State snapshot queued");
    }
}
