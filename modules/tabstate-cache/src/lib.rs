//! Key-value cache backends for persisted state.
//!
//! The persistence layer only sees the `CacheStore` trait: whole JSON values
//! addressed by string keys, read and written asynchronously. Each `set`
//! replaces the entry for its key entirely.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use traits::CacheStore;
