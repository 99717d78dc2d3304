//! SurrealUserStore tests against an in-memory SurrealDB instance.

use chrono::Utc;
use cigame_state::{
    AuditDigest, AuditEntry, ScoringEventId, StorageError, SurrealUserStore, UserId, UserStore,
};

fn sample_entry(delta: f64) -> AuditEntry {
    AuditEntry {
        event_id: ScoringEventId::new(),
        builds: vec!["app#9".to_string()],
        set_digest: AuditDigest::from_bytes(b"app#9"),
        delta,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn surreal_round_trip_create_save_load() {
    let store = SurrealUserStore::in_memory().await.unwrap();

    let mut record = store.get_or_create(&UserId::new("alice")).await.unwrap();
    assert_eq!(record.version, 1);

    record.participating = true;
    record.apply_delta(sample_entry(10.0));
    let saved = store.save(record).await.unwrap();
    assert_eq!(saved.version, 2);

    let loaded = store.get(&UserId::new("alice")).await.unwrap().unwrap();
    assert_eq!(loaded.score, 10.0);
    assert_eq!(loaded.version, 2);
    assert_eq!(loaded.history.len(), 1);
    assert_eq!(loaded.history[0].builds, vec!["app#9".to_string()]);
}

#[tokio::test]
async fn surreal_get_or_create_is_idempotent() {
    let store = SurrealUserStore::in_memory().await.unwrap();

    store.get_or_create(&UserId::new("bob")).await.unwrap();
    store.get_or_create(&UserId::new("bob")).await.unwrap();

    let records = store.list().await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn surreal_racing_creates_converge_on_one_record() {
    let store = std::sync::Arc::new(SurrealUserStore::in_memory().await.unwrap());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move { store.get_or_create(&UserId::new("dave")).await })
        })
        .collect();

    for task in tasks {
        let record = task.await.unwrap().unwrap();
        assert_eq!(record.user_id, UserId::new("dave"));
        assert!(record.version >= 1);
    }

    let records = store.list().await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn surreal_stale_save_reports_version_conflict() {
    let store = SurrealUserStore::in_memory().await.unwrap();

    let first = store.get_or_create(&UserId::new("carol")).await.unwrap();
    let stale = first.clone();

    let mut winning = first;
    winning.apply_delta(sample_entry(4.0));
    store.save(winning).await.unwrap();

    let mut losing = stale;
    losing.apply_delta(sample_entry(6.0));
    let err = store.save(losing).await.unwrap_err();
    assert!(matches!(err, StorageError::VersionConflict { .. }));

    let loaded = store.get(&UserId::new("carol")).await.unwrap().unwrap();
    assert_eq!(loaded.score, 4.0);
}

#[tokio::test]
async fn surreal_get_missing_user_is_none() {
    let store = SurrealUserStore::in_memory().await.unwrap();
    assert!(store.get(&UserId::new("ghost")).await.unwrap().is_none());
}
