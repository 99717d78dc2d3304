//! SurrealDB schema initialization for the CI game
//!
//! Sets up the `user_scores` table with its constraints and indexes.
//! Safe to call multiple times (idempotent).

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::storage_traits::StorageResult;

/// Initialize all CI game tables in SurrealDB.
pub async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    info!("Initializing CI game SurrealDB schema");
    init_user_scores_table(db).await?;
    info!("CI game schema initialization complete");
    Ok(())
}

/// Initialize `user_scores` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE user_scores {
///   user_id:        STRING (primary key, unique)
///   participating:  BOOL
///   score:          FLOAT
///   history:        ARRAY of { event_id, builds, set_digest, delta, timestamp }
///   version:        INT
///   created_at:     DATETIME
///   updated_at:     DATETIME
/// }
/// ```
///
/// Constraints:
/// - `user_id` is unique (one record per user)
/// - `history` is append-only and `version` is monotonic (enforced via
///   the version-guarded update in `SurrealUserStore::save`)
async fn init_user_scores_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("Initializing user_scores table");

    let sql = r#"
        DEFINE TABLE user_scores
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete NONE;

        -- One record per user
        DEFINE INDEX idx_user_id ON TABLE user_scores COLUMNS user_id UNIQUE;

        -- Index participation for score board filtering
        DEFINE INDEX idx_participating ON TABLE user_scores COLUMNS participating;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StorageError::Backend(format!("user_scores schema setup failed: {e}")))?;

    Ok(())
}
