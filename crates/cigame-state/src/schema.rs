//! Schema definitions for the CI game SurrealDB tables
//!
//! Tables:
//! - user_scores: one row per user, embedding the append-only audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_traits::{
    AuditDigest, AuditEntry, ScoringEventId, UserId, UserScoreRecord,
};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// One audit trail entry as stored in the `user_scores` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntryRow {
    pub event_id: String,
    pub builds: Vec<String>,
    pub set_digest: String,
    pub delta: f64,
    #[serde(with = "surreal_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl From<AuditEntry> for AuditEntryRow {
    fn from(entry: AuditEntry) -> Self {
        Self {
            event_id: entry.event_id.0,
            builds: entry.builds,
            set_digest: entry.set_digest.as_str().to_string(),
            delta: entry.delta,
            timestamp: entry.timestamp,
        }
    }
}

impl From<AuditEntryRow> for AuditEntry {
    fn from(row: AuditEntryRow) -> Self {
        Self {
            event_id: ScoringEventId(row.event_id),
            builds: row.builds,
            set_digest: AuditDigest::from_hex_unchecked(row.set_digest),
            delta: row.delta,
            timestamp: row.timestamp,
        }
    }
}

/// The `user_scores` table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserScoreRow {
    pub user_id: String,
    pub participating: bool,
    pub score: f64,
    pub history: Vec<AuditEntryRow>,
    pub version: u64,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<UserScoreRecord> for UserScoreRow {
    fn from(record: UserScoreRecord) -> Self {
        Self {
            user_id: record.user_id.0,
            participating: record.participating,
            score: record.score,
            history: record.history.into_iter().map(Into::into).collect(),
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<UserScoreRow> for UserScoreRecord {
    fn from(row: UserScoreRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            participating: row.participating,
            score: row.score,
            history: row.history.into_iter().map(Into::into).collect(),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
