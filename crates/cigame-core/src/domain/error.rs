//! Error types for scoring operations

use cigame_state::StorageError;
use thiserror::Error;

/// Errors that abort a scoring event.
///
/// Two failure classes do NOT appear here because they never abort:
/// an unresolvable upstream build makes the resolver omit that branch,
/// and an unreadable change log degrades to an empty author list with a
/// logged warning.
#[derive(Error, Debug)]
pub enum GameError {
    /// Rule evaluation could not produce any score for the build.
    /// No ledger update happens.
    #[error("Score computation failed: {0}")]
    Computation(String),

    /// Persisting a user record failed. Halts the remaining participant
    /// updates of the scoring event; earlier updates stay applied.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for scoring operations
pub type Result<T> = std::result::Result<T, GameError>;
