use thiserror::Error;

/// Structured reason a decoder gave up on an artifact
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed row in {table}: {reason}")]
    MalformedRow { table: String, reason: String },

    #[error("Artifact {0} is not a relational store")]
    NotADatabase(String),

    #[error("Artifact {0} has no readable byte content")]
    NotAFile(String),

    #[error("Media sink error: {0}")]
    Sink(String),
}

impl DecodeError {
    pub fn malformed(table: &str, reason: impl Into<String>) -> Self {
        DecodeError::MalformedRow {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for decoder operations
pub type Result<T> = std::result::Result<T, DecodeError>;
