use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecmanError>;

#[derive(Debug, Error)]
pub enum RecmanError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Text must not be empty")]
    EmptyText,

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Board integrity violated: {0}")]
    BoardIntegrity(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Project not initialized. Run 'recman init' first.")]
    ProjectNotInitialized,
}
