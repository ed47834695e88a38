//! Background cache writer.
//!
//! Drains persistence tasks in issue order and writes each snapshot to the
//! cache. A failed write is logged and counted; it is never retried and never
//! reported back to the commit path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tabstate_cache::CacheStore;
use tabstate_common::CachedState;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One snapshot to write under one key.
#[derive(Debug, Clone)]
pub struct PersistTask {
    pub key: String,
    pub snapshot: CachedState,
    /// Issue order, starting at 1.
    pub seq: u64,
}

/// Outcome counters, shared between the writer task and its handle.
#[derive(Debug, Default)]
pub struct WriterStats {
    written: AtomicU64,
    failed: AtomicU64,
}

impl WriterStats {
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }
}

pub struct CacheWriter;

impl CacheWriter {
    /// Spawn the writer on the current tokio runtime.
    pub fn spawn<C>(cache: C, tasks: mpsc::UnboundedReceiver<PersistTask>) -> WriterHandle
    where
        C: CacheStore + 'static,
    {
        let stats = Arc::new(WriterStats::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(run(cache, tasks, shutdown_rx, Arc::clone(&stats)));

        WriterHandle {
            stats,
            shutdown_tx: Some(shutdown_tx),
            join,
        }
    }
}

/// Owner-side handle to a running writer.
pub struct WriterHandle {
    stats: Arc<WriterStats>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl WriterHandle {
    pub fn stats(&self) -> Arc<WriterStats> {
        Arc::clone(&self.stats)
    }

    /// Close the queue, finish every task already issued, then stop.
    ///
    /// Snapshots issued after this point are dropped by the plugin with a
    /// warning.
    pub async fn shutdown(mut self) -> Arc<WriterStats> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.join).await {
            warn!(error = %e, "Cache writer task ended abnormally");
        }
        self.stats
    }
}

async fn run<C: CacheStore>(
    cache: C,
    mut tasks: mpsc::UnboundedReceiver<PersistTask>,
    mut shutdown: oneshot::Receiver<()>,
    stats: Arc<WriterStats>,
) {
    // A dropped handle detaches the writer instead of stopping it.
    let mut handle_attached = true;

    loop {
        tokio::select! {
            biased;
            maybe_task = tasks.recv() => match maybe_task {
                Some(task) => write_one(&cache, task, &stats).await,
                // Every sender dropped
                None => break,
            },
            signal = &mut shutdown, if handle_attached => match signal {
                Ok(()) => {
                    tasks.close();
                    while let Some(task) = tasks.recv().await {
                        write_one(&cache, task, &stats).await;
                    }
                    break;
                }
                Err(_) => handle_attached = false,
            },
        }
    }

    info!(
        written = stats.written(),
        failed = stats.failed(),
        "Cache writer stopped"
    );
}

async fn write_one<C: CacheStore>(cache: &C, task: PersistTask, stats: &WriterStats) {
    let value = match serde_json::to_value(&task.snapshot) {
        Ok(value) => value,
        Err(e) => {
            stats.failed.fetch_add(1, Ordering::SeqCst);
            warn!(error = %e, key = task.key.as_str(), seq = task.seq, "failed to cache state");
            return;
        }
    };

    match cache.set(&task.key, value).await {
        Ok(()) => {
            stats.written.fetch_add(1, Ordering::SeqCst);
            debug!(key = task.key.as_str(), seq = task.seq, "State cached");
        }
        Err(e) => {
            stats.failed.fetch_add(1, Ordering::SeqCst);
            warn!(error = %e, key = task.key.as_str(), seq = task.seq, "failed to cache state");
        }
    }
}
