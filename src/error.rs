//! Error types for Lese.

use thiserror::Error;

/// Library-level error type for Lese operations.
#[derive(Error, Debug)]
pub enum LeseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    #[error("Invalid chunking configuration: {0}")]
    InvalidChunkConfig(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Response generation failed: {0}")]
    Generation(String),

    #[error("Invalid video reference: {0}")]
    InvalidVideoReference(String),

    #[error("Transcript unavailable: {0}")]
    Transcript(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Lese operations.
pub type Result<T> = std::result::Result<T, LeseError>;
