pub mod config;
pub mod error;
pub mod file_config;
pub mod mutation;
pub mod reduce;
pub mod types;

pub use config::{is_valid_cache_key, PersistConfig};
pub use error::{Result, TabStateError};
pub use mutation::{category_from_name, AppMutation, LOAD_FROM_CACHE, RESET_MARKER};
pub use reduce::AppReducer;
pub use types::*;
