//! Domain model for the CI game scoring engine.

pub mod build;
pub mod error;
pub mod score;
pub mod user;

pub use build::{Build, BuildId, BuildResult, Cause, ChangeEntry, ChangeLog};
pub use error::{GameError, Result};
pub use score::{ScoreCard, ScoreEntry};
pub use user::User;
