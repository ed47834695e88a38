use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabStateError {
    #[error("Cache write error: {0}")]
    CacheWrite(String),

    #[error("Cache read error: {0}")]
    CacheRead(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TabStateError>;
