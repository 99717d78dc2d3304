//! In-memory fakes for the `UserStore` trait (testing only)
//!
//! `MemoryUserStore` satisfies the full trait contract, including the
//! version-conflict behavior, without any external dependencies.
//! `FlakyUserStore` wraps another store and fails `save` for designated
//! users, for exercising the halt-on-storage-failure path.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryUserStore
// ---------------------------------------------------------------------------

/// In-memory user store backed by a `HashMap<user id, record>`.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    records: Mutex<HashMap<String, UserScoreRecord>>,
    config: StoreConfig,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose lazily created records are opted into the game.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            config,
        }
    }

}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_or_create(&self, user_id: &UserId) -> StorageResult<UserScoreRecord> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.get(&user_id.0) {
            return Ok(existing.clone());
        }
        let mut record = UserScoreRecord::new(user_id.clone(), self.config.participate_by_default);
        record.version = 1;
        records.insert(user_id.0.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: &UserId) -> StorageResult<Option<UserScoreRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&user_id.0).cloned())
    }

    async fn save(&self, mut record: UserScoreRecord) -> StorageResult<UserScoreRecord> {
        let mut records = self.records.lock().unwrap();
        let persisted = records
            .get(&record.user_id.0)
            .ok_or_else(|| StorageError::UserNotFound {
                user_id: record.user_id.0.clone(),
            })?;
        if persisted.version != record.version {
            return Err(StorageError::VersionConflict {
                user_id: record.user_id.0.clone(),
                loaded: record.version,
                persisted: persisted.version,
            });
        }
        record.version += 1;
        records.insert(record.user_id.0.clone(), record.clone());
        Ok(record)
    }

    async fn list(&self) -> StorageResult<Vec<UserScoreRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.values().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// FlakyUserStore
// ---------------------------------------------------------------------------

/// Wrapper store that fails `save` for a configured set of users.
pub struct FlakyUserStore<S> {
    inner: S,
    fail_saves_for: HashSet<String>,
}

impl<S: UserStore> FlakyUserStore<S> {
    pub fn new(inner: S, fail_saves_for: impl IntoIterator<Item = String>) -> Self {
        Self {
            inner,
            fail_saves_for: fail_saves_for.into_iter().collect(),
        }
    }
}

#[async_trait]
impl<S: UserStore> UserStore for FlakyUserStore<S> {
    async fn get_or_create(&self, user_id: &UserId) -> StorageResult<UserScoreRecord> {
        self.inner.get_or_create(user_id).await
    }

    async fn get(&self, user_id: &UserId) -> StorageResult<Option<UserScoreRecord>> {
        self.inner.get(user_id).await
    }

    async fn save(&self, record: UserScoreRecord) -> StorageResult<UserScoreRecord> {
        if self.fail_saves_for.contains(&record.user_id.0) {
            return Err(StorageError::Backend(format!(
                "injected save failure for {}",
                record.user_id
            )));
        }
        self.inner.save(record).await
    }

    async fn list(&self) -> StorageResult<Vec<UserScoreRecord>> {
        self.inner.list().await
    }
}
