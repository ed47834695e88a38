use std::env;

use serde::Deserialize;
use tracing::info;

use crate::error::{Result, TabStateError};

/// Well-known key the whole snapshot is stored under.
pub const DEFAULT_CACHE_KEY: &str = "state";

/// Posts kept in the cached feed. Mirrors the content service's page size.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Cache keys double as file names: ASCII letters, digits, `-`, `_` and `.`,
/// not starting with `.`.
pub fn is_valid_cache_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersistConfig {
    pub cache_key: String,
    pub page_size: usize,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PersistConfig {
    /// Defaults, overridden by `TABSTATE_CACHE_KEY` and `TABSTATE_PAGE_SIZE`.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(key) = env::var("TABSTATE_CACHE_KEY") {
            self.cache_key = key;
        }
        if let Ok(raw) = env::var("TABSTATE_PAGE_SIZE") {
            self.page_size = raw.parse().map_err(|_| {
                TabStateError::Config(format!("TABSTATE_PAGE_SIZE must be a number, got {raw:?}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_key.trim().is_empty() {
            return Err(TabStateError::Config("cache_key must not be empty".into()));
        }
        if !is_valid_cache_key(&self.cache_key) {
            return Err(TabStateError::Config(format!(
                "cache_key {:?} may only contain ASCII letters, digits, '-', '_' and '.', and must not start with '.'",
                self.cache_key
            )));
        }
        Ok(())
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn log(&self) {
        info!(
            cache_key = self.cache_key.as_str(),
            page_size = self.page_size,
            "Persistence config"
        );
    }
}
