//! Core traits for the state store.

/// How a committed mutation relates to the persisted cache.
///
/// Decided where the mutation is defined, not by inspecting its name at
/// commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationCategory {
    /// Ordinary state change. The resulting state should be cached.
    Cacheable,
    /// State is being seeded from the cache itself. Writing it back would loop.
    RestoredFromCache,
    /// A deliberate clear. The cleared state must not overwrite the cache.
    ResetLike,
}

impl MutationCategory {
    pub fn is_cacheable(self) -> bool {
        matches!(self, MutationCategory::Cacheable)
    }
}

/// Mutations carry a stable type name and a cache category.
pub trait MutationLike: Send + Sync + 'static {
    /// The mutation's type name, e.g. `setPublications`.
    fn mutation_type(&self) -> &str;

    fn category(&self) -> MutationCategory;
}

/// Pure state updates. No I/O, no side effects.
///
/// Called once per commit, before any subscriber sees the new state.
pub trait Reducer<M: MutationLike, S>: Send + Sync {
    fn reduce(&self, state: &mut S, mutation: &M);
}

/// Observes every committed mutation.
///
/// Runs synchronously inside the commit path, after the reducer, so it sees
/// post-mutation state. Implementations must not block: anything slow belongs
/// on a task of its own.
pub trait Subscriber<M: MutationLike, S>: Send + Sync {
    fn on_commit(&self, mutation: &M, state: &S);
}

impl<M, S, F> Subscriber<M, S> for F
where
    M: MutationLike,
    F: Fn(&M, &S) + Send + Sync,
{
    fn on_commit(&self, mutation: &M, state: &S) {
        self(mutation, state)
    }
}
