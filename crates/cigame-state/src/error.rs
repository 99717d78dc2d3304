//! Error types for cigame-state

use thiserror::Error;

/// Errors that can occur in the user score persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// No record exists for the given user
    #[error("User record not found: {user_id}")]
    UserNotFound { user_id: String },

    /// A concurrent save moved the persisted record past the loaded version
    #[error("Stale record for user {user_id}: loaded version {loaded}, persisted version {persisted}")]
    VersionConflict {
        user_id: String,
        loaded: u64,
        persisted: u64,
    },

    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Backend query error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
