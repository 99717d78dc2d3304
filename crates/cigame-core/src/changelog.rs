//! Change log access: extracting the authors behind a build.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{Build, ChangeLog, User};

/// Source of the ordered author list for a build.
///
/// Implementations must never fail a scoring event: a build whose
/// changes cannot be read yields an empty list.
#[async_trait]
pub trait ChangeLogSource: Send + Sync {
    /// Ordered list of users who committed changes included in `build`.
    /// Repeated authors appear repeatedly; deduplication is the
    /// collector's job.
    async fn authors_of(&self, build: &Build) -> Vec<User>;
}

/// Default source reading the build's own `ChangeLog` capability.
#[derive(Debug, Default)]
pub struct BuildChangeLog;

impl BuildChangeLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChangeLogSource for BuildChangeLog {
    async fn authors_of(&self, build: &Build) -> Vec<User> {
        match &build.change_log {
            ChangeLog::Single(entries) => entries.iter().map(|e| e.author.clone()).collect(),
            ChangeLog::Composite(sets) => sets
                .iter()
                .flat_map(|set| set.iter().map(|e| e.author.clone()))
                .collect(),
            ChangeLog::Unsupported => {
                warn!(build = %build.id, "build type exposes no readable change log, crediting nobody");
                Vec::new()
            }
        }
    }
}
