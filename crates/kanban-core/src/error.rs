use thiserror::Error;

/// Process-level failures: configuration, local state, client construction.
///
/// Remote call failures never use this type; they are reported as
/// [`NormalizedError`](crate::NormalizedError) instead.
#[derive(Error, Debug)]
pub enum KanbanError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Persistence error for '{key}': {message}")]
    Persistence { key: String, message: String },
}

impl From<serde_json::Error> for KanbanError {
    fn from(err: serde_json::Error) -> Self {
        KanbanError::Serialization(err.to_string())
    }
}
