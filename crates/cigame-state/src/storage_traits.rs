//! Storage trait definitions for the CI game
//!
//! The contract here is the `UserStore`: load-or-create, version-checked
//! save, and leaderboard listing of `UserScoreRecord`s. Everything a
//! scoring event persists goes through this trait; an in-memory fake for
//! testing lives in the `fakes` module and a SurrealDB implementation
//! in `surreal_store`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable, case-preserving user identifier.
///
/// Whether two ids that differ only in case name the same person is a
/// collection-time policy, not a storage concern: the store always keys
/// records by the exact id it is given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one scoring event (one build completion).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoringEventId(pub String);

impl ScoringEventId {
    /// Generate a new random ScoringEventId
    pub fn new() -> Self {
        ScoringEventId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ScoringEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScoringEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 hex digest used by audit entries to reference the exact
/// accountable-build set a delta was awarded for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditDigest(String);

impl AuditDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        AuditDigest(hex::encode(hasher.finalize()))
    }

    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }

    /// Rehydrate a digest previously produced by `from_bytes` (DB rows).
    pub(crate) fn from_hex_unchecked(hex: String) -> Self {
        AuditDigest(hex)
    }
}

impl std::fmt::Display for AuditDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// UserScoreRecord — the per-user ledger row
// ---------------------------------------------------------------------------

/// One append-only audit trail entry: a single score delta and the
/// accountable builds it was awarded for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Scoring event this delta belongs to.
    pub event_id: ScoringEventId,
    /// Display references of the accountable builds (e.g. `"app#42"`).
    pub builds: Vec<String>,
    /// Digest of the full accountable-build set.
    pub set_digest: AuditDigest,
    /// Signed score delta applied to the cumulative score.
    pub delta: f64,
    /// When the delta was applied.
    pub timestamp: DateTime<Utc>,
}

/// Persistent score record owned by one user.
///
/// Invariants:
/// - `score` equals the sum of all `history` deltas at any point.
/// - `history` is append-only; entries are never rewritten or removed.
/// - `version` increments on every successful save and is the basis for
///   optimistic concurrency control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserScoreRecord {
    pub user_id: UserId,
    /// Whether the user takes part in the game. Records created lazily
    /// default to the store's configured participation.
    pub participating: bool,
    /// Cumulative score.
    pub score: f64,
    /// Append-only audit trail.
    pub history: Vec<AuditEntry>,
    /// Persisted version, bumped by `UserStore::save`.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserScoreRecord {
    /// Create a fresh, never-persisted record.
    pub fn new(user_id: UserId, participating: bool) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            participating,
            score: 0.0,
            history: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply one score delta: add it to the cumulative score and append
    /// the audit entry. This is the only mutation the engine performs.
    pub fn apply_delta(&mut self, entry: AuditEntry) {
        self.score += entry.delta;
        self.updated_at = entry.timestamp;
        self.history.push(entry);
    }
}

// ---------------------------------------------------------------------------
// UserStore
// ---------------------------------------------------------------------------

/// Store-level configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Participation assigned to records created lazily by
    /// `get_or_create`. `false` means "not yet decided": the record
    /// exists but accrues no score until the user opts in.
    pub participate_by_default: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            participate_by_default: false,
        }
    }
}

/// Persistent user score store.
///
/// Guarantees:
/// - `get_or_create` persists a fresh record (version 1) if none exists,
///   using the store's configured default participation.
/// - `save` succeeds only when the caller's `version` still matches the
///   persisted record; otherwise it fails with `VersionConflict` and the
///   caller is expected to reload and reapply. This serializes the
///   read-modify-write cycle per user across concurrent scoring events.
/// - `save` never partially applies: the returned record (with bumped
///   version) is exactly what was persisted.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load a user's record, creating and persisting a fresh one if absent.
    async fn get_or_create(&self, user_id: &UserId) -> StorageResult<UserScoreRecord>;

    /// Load a user's record without creating it.
    async fn get(&self, user_id: &UserId) -> StorageResult<Option<UserScoreRecord>>;

    /// Persist a record loaded via `get`/`get_or_create`.
    ///
    /// Fails with `StorageError::VersionConflict` if the persisted
    /// version moved since the record was loaded.
    async fn save(&self, record: UserScoreRecord) -> StorageResult<UserScoreRecord>;

    /// List all records (score board view), unordered.
    async fn list(&self) -> StorageResult<Vec<UserScoreRecord>>;
}
