//! Accountability resolution: which builds share credit or blame for a
//! build's outcome.
//!
//! The resolved set always contains the triggering build, plus at most
//! one upstream contribution (the root of the upstream-cause chain) and
//! the contiguous run of immediately preceding aborted builds in the
//! same job. Resolution is read-only and pure: the same build graph
//! state always yields the same set.

use std::collections::HashSet;
use std::sync::Arc;

use cigame_state::AuditDigest;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Build, BuildId, BuildResult};
use crate::graph::BuildGraph;

/// Bound on the upstream-cause walk, guarding against malformed cause
/// graphs that the visited-set check alone would not catch (unbounded
/// non-repeating chains of generated jobs).
pub const DEFAULT_UPSTREAM_DEPTH_LIMIT: usize = 32;

/// Ordered set of builds contributing to one scoring event.
///
/// Non-empty by construction (the triggering build comes first) and
/// free of duplicate build ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountableBuildSet {
    builds: Vec<Build>,
}

impl AccountableBuildSet {
    fn seeded_with(build: Build) -> Self {
        Self {
            builds: vec![build],
        }
    }

    /// Append a build unless its id is already present.
    fn push_unique(&mut self, build: Build) {
        if !self.contains(&build.id) {
            self.builds.push(build);
        }
    }

    /// The builds, triggering build first.
    pub fn builds(&self) -> &[Build] {
        &self.builds
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    pub fn contains(&self, id: &BuildId) -> bool {
        self.builds.iter().any(|b| &b.id == id)
    }

    /// Display references for audit entries and log lines, e.g. `app#42`.
    pub fn refs(&self) -> Vec<String> {
        self.builds.iter().map(|b| b.id.to_string()).collect()
    }

    /// Content digest of the set, stored by audit entries so a delta can
    /// be traced back to the exact builds it was awarded for.
    pub fn digest(&self) -> AuditDigest {
        AuditDigest::from_bytes(self.refs().join("\n").as_bytes())
    }
}

/// Resolves the accountable build set for a completed build.
pub struct AccountabilityResolver {
    graph: Arc<dyn BuildGraph>,
    upstream_depth_limit: usize,
}

impl AccountabilityResolver {
    pub fn new(graph: Arc<dyn BuildGraph>) -> Self {
        Self {
            graph,
            upstream_depth_limit: DEFAULT_UPSTREAM_DEPTH_LIMIT,
        }
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.upstream_depth_limit = limit;
        self
    }

    /// Resolve the accountable set for `build`.
    ///
    /// The upstream walk and the aborted backfill are independent and
    /// both always run.
    pub async fn resolve(&self, build: &Build) -> AccountableBuildSet {
        let mut set = AccountableBuildSet::seeded_with(build.clone());

        if let Some(root) = self.upstream_root(build).await {
            debug!(build = %build.id, upstream = %root.id, "resolved upstream root");
            set.push_unique(root);
        }

        // Aborted-run backfill: the aborted predecessors never got
        // scored themselves, so their changes ride along with this one.
        let mut prev_id = build.previous.clone();
        while let Some(id) = prev_id {
            if set.contains(&id) {
                warn!(build = %build.id, repeat = %id, "cycle in previous links, stopping backfill");
                break;
            }
            match self.graph.build_by_id(&id).await {
                Some(prev) if prev.result == Some(BuildResult::Aborted) => {
                    prev_id = prev.previous.clone();
                    set.push_unique(prev);
                }
                _ => break,
            }
        }

        set
    }

    /// Walk the upstream-cause chain to its root-most build.
    ///
    /// Intermediate links are not accountable, only the root. An
    /// unresolvable link drops the whole branch; a cycle or the depth
    /// limit stops the walk and keeps the deepest build fetched so far.
    async fn upstream_root(&self, build: &Build) -> Option<Build> {
        let (job, number) = build.upstream_cause()?;

        let mut visited: HashSet<BuildId> = HashSet::new();
        visited.insert(build.id.clone());

        let Some(mut current) = self.graph.build(job, number).await else {
            warn!(build = %build.id, job, number, "upstream build no longer exists, skipping branch");
            return None;
        };

        let mut depth = 1;
        loop {
            if !visited.insert(current.id.clone()) {
                warn!(build = %build.id, repeat = %current.id, "cycle in upstream causes, stopping walk");
                return Some(current);
            }

            let Some((job, number)) = current.upstream_cause() else {
                return Some(current);
            };

            if depth >= self.upstream_depth_limit {
                warn!(build = %build.id, depth, "upstream chain exceeds depth limit, stopping walk");
                return Some(current);
            }

            match self.graph.build(job, number).await {
                Some(next) => {
                    depth += 1;
                    current = next;
                }
                None => {
                    warn!(build = %build.id, job, number, "upstream build no longer exists, skipping branch");
                    return None;
                }
            }
        }
    }
}
