//! Cigame-State: persistence layer for the CI game
//!
//! This crate owns the durable side of the scoring engine: per-user
//! cumulative scores with an append-only audit trail of every delta,
//! keyed by a stable user id.
//!
//! ## Key Components
//!
//! - `UserStore`: the storage trait the score ledger writes through
//! - `UserScoreRecord` / `AuditEntry`: the persisted schema
//! - `MemoryUserStore`: in-memory fake satisfying the full contract
//! - `SurrealUserStore`: SurrealDB-backed implementation
//!
//! Concurrency model: record versions plus version-checked saves give
//! optimistic per-user serialization; concurrent scoring events that
//! touch the same user retry instead of losing updates.

mod error;
pub mod fakes;
mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_store;

pub use error::StorageError;
pub use schema::{AuditEntryRow, UserScoreRow};
pub use storage_traits::{
    AuditDigest, AuditEntry, ScoringEventId, StorageResult, StoreConfig, UserId, UserScoreRecord,
    UserStore,
};
pub use surreal_store::SurrealUserStore;
