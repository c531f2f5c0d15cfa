use thiserror::Error;

// Custom Result type alias for convenient use across the crate
pub type Result<T> = std::result::Result<T, LogCtxError>;

#[derive(Error, Debug)]
pub enum LogCtxError {
    #[error("Environment error: {0}")]
    Env(#[from] envy::Error),

    #[error("no encoder registered for name {0:?}")]
    UnknownEncoding(String),

    #[error("unrecognized level: {0:?}")]
    InvalidLevel(String),

    #[error("{0}")]
    LevelBody(String),
}
