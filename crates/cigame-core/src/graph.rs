//! Build graph access: resolving job names and build numbers to builds.
//!
//! The resolver never reaches into a process-wide server instance; it is
//! handed a `BuildGraph` capability instead. A lookup miss means the job
//! or build no longer exists (deleted, renamed) and is not an error.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Build, BuildId};

/// Read-only view of the host server's builds.
#[async_trait]
pub trait BuildGraph: Send + Sync {
    /// Look up a build by job name and number. `None` if the job or
    /// build cannot be resolved.
    async fn build(&self, job: &str, number: u32) -> Option<Build>;

    /// Look up a build by id.
    async fn build_by_id(&self, id: &BuildId) -> Option<Build> {
        self.build(&id.job, id.number).await
    }
}

/// In-memory build graph backed by a `HashMap<BuildId, Build>`.
///
/// Doubles as the test double and as the adapter target for embedding
/// the engine in a host that keeps builds in memory.
#[derive(Debug, Default)]
pub struct MemoryBuildGraph {
    builds: Mutex<HashMap<BuildId, Build>>,
}

impl MemoryBuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a build, replacing any previous entry with the same id.
    pub fn insert(&self, build: Build) {
        let mut builds = self.builds.lock().unwrap();
        builds.insert(build.id.clone(), build);
    }

    /// Remove a build (models a deleted or renamed job).
    pub fn remove(&self, id: &BuildId) {
        let mut builds = self.builds.lock().unwrap();
        builds.remove(id);
    }
}

#[async_trait]
impl BuildGraph for MemoryBuildGraph {
    async fn build(&self, job: &str, number: u32) -> Option<Build> {
        let builds = self.builds.lock().unwrap();
        builds.get(&BuildId::new(job, number)).cloned()
    }
}
