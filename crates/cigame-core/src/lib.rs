//! CI Game Core - accountability and scoring engine
//!
//! Awards gamified points for a build's outcome to the users whose
//! changes are accountable for it:
//! - Resolves which historical builds share credit or blame
//!   (upstream-cause root plus preceding aborted runs)
//! - Collects the participating users from those builds' change logs
//! - Atomically distributes the score to each participant's persistent
//!   record with an append-only audit trail

pub mod changelog;
pub mod collector;
pub mod domain;
pub mod graph;
pub mod ledger;
pub mod listener;
pub mod publisher;
pub mod resolver;
pub mod rules;
pub mod telemetry;

// Re-export key types
pub use changelog::{BuildChangeLog, ChangeLogSource};
pub use collector::{CaseSensitivity, ParticipantCollector};
pub use domain::{
    Build, BuildId, BuildResult, Cause, ChangeEntry, ChangeLog, GameError, Result, ScoreCard,
    ScoreEntry, User,
};
pub use graph::{BuildGraph, MemoryBuildGraph};
pub use ledger::{ScoreLedger, DEFAULT_SAVE_RETRIES};
pub use listener::{Listener, MemoryListener, TracingListener};
pub use publisher::{GameConfig, GamePublisher, ScoreCardAttachment};
pub use resolver::{AccountabilityResolver, AccountableBuildSet, DEFAULT_UPSTREAM_DEPTH_LIMIT};
pub use rules::{Rule, RuleSet, ScoreComputer};
pub use telemetry::init_tracing;

pub use cigame_state::{
    AuditDigest, AuditEntry, ScoringEventId, StorageError, StoreConfig, UserId, UserScoreRecord,
    UserStore,
};
