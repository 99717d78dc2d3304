//! SurrealDB-backed UserStore implementation
//!
//! Uses `schema::UserScoreRow` for persistence, converting to/from
//! `storage_traits` types at the boundary. Concurrency control is
//! optimistic: `save` updates the row only where the persisted version
//! still matches the loaded one, and reports `VersionConflict` otherwise.

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::migrations;
use crate::schema::UserScoreRow;
use crate::storage_traits::{
    StorageResult, StoreConfig, UserId, UserScoreRecord, UserStore,
};

/// SurrealDB-backed implementation of [`UserStore`].
pub struct SurrealUserStore {
    db: Surreal<Any>,
    config: StoreConfig,
}

impl SurrealUserStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `cigame/main`, and runs `init_schema`.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect("mem://", StoreConfig::default()).await
    }

    /// Connect to the given SurrealDB endpoint.
    pub async fn connect(url: &str, config: StoreConfig) -> StorageResult<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to connect to {url}: {e}")))?;

        db.use_ns("cigame")
            .use_db("main")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!("SurrealUserStore connected ({})", url);
        Ok(Self { db, config })
    }

    /// Create from the `SURREALDB_URL` environment variable, defaulting
    /// to local persistence in `.cigame/db`.
    pub async fn from_env(config: StoreConfig) -> StorageResult<Self> {
        if let Ok(url) = std::env::var("SURREALDB_URL") {
            return Self::connect(&url, config).await;
        }

        let path = ".cigame/db";
        std::fs::create_dir_all(path).map_err(|e| {
            StorageError::Connection(format!(
                "Failed to create database directory {}: {}",
                path, e
            ))
        })?;
        let url = format!("surrealkv://{}", path);
        info!(
            "No SURREALDB_URL found, using local persistence: {}",
            url
        );
        Self::connect(&url, config).await
    }

    // -- private helpers -----------------------------------------------------

    /// Fetch a user row by id, if present.
    async fn fetch_row(&self, uid: &str) -> StorageResult<Option<UserScoreRow>> {
        let uid_owned = uid.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM user_scores WHERE user_id = $uid")
            .bind(("uid", uid_owned))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<UserScoreRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl UserStore for SurrealUserStore {
    async fn get_or_create(&self, user_id: &UserId) -> StorageResult<UserScoreRecord> {
        if let Some(row) = self.fetch_row(&user_id.0).await? {
            return Ok(row.into());
        }

        let mut record = UserScoreRecord::new(user_id.clone(), self.config.participate_by_default);
        record.version = 1;

        debug!(user_id = %user_id, "creating user score record");

        let row: UserScoreRow = record.clone().into();
        let created: Result<Option<UserScoreRow>, surrealdb::Error> =
            self.db.create("user_scores").content(row).await;

        match created {
            Ok(_) => Ok(record),
            // Lost a create race: the unique user_id index rejects the
            // second insert, and the winner's row is authoritative.
            Err(e) => match self.fetch_row(&user_id.0).await? {
                Some(existing) => {
                    debug!(user_id = %user_id, "concurrent create, using existing record");
                    Ok(existing.into())
                }
                None => Err(StorageError::Backend(e.to_string())),
            },
        }
    }

    async fn get(&self, user_id: &UserId) -> StorageResult<Option<UserScoreRecord>> {
        Ok(self.fetch_row(&user_id.0).await?.map(Into::into))
    }

    async fn save(&self, mut record: UserScoreRecord) -> StorageResult<UserScoreRecord> {
        let loaded_version = record.version;
        record.version += 1;

        let uid_owned = record.user_id.0.clone();
        let row: UserScoreRow = record.clone().into();

        // Version-guarded update: touches the row only if nobody saved
        // in between. An empty result set means the guard did not match.
        let mut res = self
            .db
            .query("UPDATE user_scores CONTENT $row WHERE user_id = $uid AND version = $v")
            .bind(("row", row))
            .bind(("uid", uid_owned))
            .bind(("v", loaded_version))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let updated: Vec<UserScoreRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        if updated.is_empty() {
            return match self.fetch_row(&record.user_id.0).await? {
                Some(current) => Err(StorageError::VersionConflict {
                    user_id: record.user_id.0.clone(),
                    loaded: loaded_version,
                    persisted: current.version,
                }),
                None => Err(StorageError::UserNotFound {
                    user_id: record.user_id.0.clone(),
                }),
            };
        }

        Ok(record)
    }

    async fn list(&self) -> StorageResult<Vec<UserScoreRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM user_scores")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<UserScoreRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
