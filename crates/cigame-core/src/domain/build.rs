//! Build identity, result severity, causes, and change logs.

use serde::{Deserialize, Serialize};

use crate::domain::user::User;

/// Completion result of a build, by ordinal severity.
///
/// Ordering is part of the contract: `Success < Unstable < Failure <
/// Aborted`, so threshold checks read as `is_better_or_equal_to`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    Aborted,
}

impl BuildResult {
    /// Whether this result is at least as good as `threshold`.
    pub fn is_better_or_equal_to(&self, threshold: BuildResult) -> bool {
        *self <= threshold
    }
}

/// Identity of one build: a job name plus a build number unique within
/// that job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildId {
    pub job: String,
    pub number: u32,
}

impl BuildId {
    pub fn new(job: impl Into<String>, number: u32) -> Self {
        Self {
            job: job.into(),
            number,
        }
    }
}

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.job, self.number)
    }
}

/// Why a build was started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Cause {
    /// Started by hand or by an unmodeled trigger.
    Manual,
    /// Started because an upstream build completed.
    Upstream { job: String, number: u32 },
}

/// One committed change included in a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub author: User,
    pub message: String,
}

impl ChangeEntry {
    pub fn new(author: User, message: impl Into<String>) -> Self {
        Self {
            author,
            message: message.into(),
        }
    }
}

/// How a build exposes its change history.
///
/// This replaces runtime probing of the build type with an explicit
/// capability: freestyle-like builds carry a single change set,
/// pipeline-like builds carry one change set per checkout, and anything
/// the engine does not understand degrades to no authors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "entries")]
pub enum ChangeLog {
    /// One change set for the whole build.
    Single(Vec<ChangeEntry>),
    /// Several change sets (pipeline-style composite builds).
    Composite(Vec<Vec<ChangeEntry>>),
    /// Build type the engine cannot read changes from.
    Unsupported,
}

/// A completed (or at least known) build in the host CI server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    /// Final result; `None` while the build is still running.
    pub result: Option<BuildResult>,
    /// Previous build in the same job, if any.
    pub previous: Option<BuildId>,
    pub causes: Vec<Cause>,
    pub change_log: ChangeLog,
}

impl Build {
    pub fn new(id: BuildId, result: BuildResult) -> Self {
        Self {
            id,
            result: Some(result),
            previous: None,
            causes: Vec::new(),
            change_log: ChangeLog::Single(Vec::new()),
        }
    }

    pub fn with_previous(mut self, previous: BuildId) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.causes.push(cause);
        self
    }

    pub fn with_change_log(mut self, change_log: ChangeLog) -> Self {
        self.change_log = change_log;
        self
    }

    /// The upstream (job, number) this build was triggered by, iff
    /// exactly one upstream cause is present. Multiple upstream causes
    /// are ambiguous and credit nobody.
    pub fn upstream_cause(&self) -> Option<(&str, u32)> {
        let mut upstream = self.causes.iter().filter_map(|c| match c {
            Cause::Upstream { job, number } => Some((job.as_str(), *number)),
            Cause::Manual => None,
        });
        match (upstream.next(), upstream.next()) {
            (Some(found), None) => Some(found),
            _ => None,
        }
    }
}
