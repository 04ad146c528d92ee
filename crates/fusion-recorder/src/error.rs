//! Error types for the recorder

use thiserror::Error;

/// Result type for recorder operations
pub type RecorderResult<T> = Result<T, RecorderError>;

/// Errors that can occur while reading or writing the store
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Underlying SQLite failure
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Payload (de)serialization failure
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Replay of an event id that is already stored
    #[error("event '{event_id}' is already persisted")]
    DuplicateEvent { event_id: String },

    /// A row referenced by id does not exist
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A stored column value no longer parses
    #[error("corrupt row: {what}")]
    Corrupt { what: String },
}

impl RecorderError {
    /// Whether this error is the duplicate-event constraint failure
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RecorderError::DuplicateEvent { .. })
    }
}
