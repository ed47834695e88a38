//! Application state store.
//!
//! Provides a generic commit loop: reduce → notify subscribers. All state
//! changes go through `Store::commit`, which produces a fresh state reference
//! so that snapshots taken by subscribers stay valid forever.
//!
//! Consumers define their domain by implementing `MutationLike` (named,
//! categorised mutations), `Reducer` (pure state updates) and `Subscriber`
//! (side-effect hooks such as cache persistence).

pub mod store;
pub mod traits;

pub use store::Store;
pub use traits::{MutationCategory, MutationLike, Reducer, Subscriber};
