//! The commit path.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::traits::{MutationLike, Reducer, Subscriber};

/// Single-writer application store.
///
/// Reduce → notify. Every commit produces a new state reference; snapshots
/// handed out earlier are never touched again (copy-on-write via
/// `Arc::make_mut`).
pub struct Store<M, S, Red>
where
    M: MutationLike,
    S: Clone,
    Red: Reducer<M, S>,
{
    reducer: Red,
    state: Arc<S>,
    subscribers: Vec<Box<dyn Subscriber<M, S>>>,
    commits: u64,
    _phantom: PhantomData<fn() -> M>,
}

impl<M, S, Red> Store<M, S, Red>
where
    M: MutationLike,
    S: Clone,
    Red: Reducer<M, S>,
{
    pub fn new(reducer: Red, initial: S) -> Self {
        Self {
            reducer,
            state: Arc::new(initial),
            subscribers: Vec::new(),
            commits: 0,
            _phantom: PhantomData,
        }
    }

    /// Register a commit observer. Subscribers run in registration order.
    pub fn subscribe<Sub>(&mut self, subscriber: Sub)
    where
        Sub: Subscriber<M, S> + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Builder-style `subscribe`, for wiring plugins at construction time.
    pub fn with_subscriber<Sub>(mut self, subscriber: Sub) -> Self
    where
        Sub: Subscriber<M, S> + 'static,
    {
        self.subscribe(subscriber);
        self
    }

    /// Apply a mutation and notify subscribers. Returns the new state.
    pub fn commit(&mut self, mutation: M) -> Arc<S> {
        // 1. Reduce (clones only if a previous snapshot is still held)
        self.reducer.reduce(Arc::make_mut(&mut self.state), &mutation);
        self.commits += 1;

        trace!(
            mutation = mutation.mutation_type(),
            seq = self.commits,
            "mutation committed"
        );

        // 2. Notify with post-mutation state
        for subscriber in &self.subscribers {
            subscriber.on_commit(&mutation, &self.state);
        }

        Arc::clone(&self.state)
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state)
    }

    /// Number of mutations committed so far.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
