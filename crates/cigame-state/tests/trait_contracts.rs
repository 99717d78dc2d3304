//! Trait contract tests for UserStore.
//!
//! These tests verify the behavioral contract of the storage trait
//! using the in-memory fake. Any conforming implementation must pass
//! the same assertions.

use std::sync::Arc;

use chrono::Utc;
use cigame_state::fakes::{FlakyUserStore, MemoryUserStore};
use cigame_state::{
    AuditDigest, AuditEntry, ScoringEventId, StorageError, StoreConfig, UserId, UserScoreRecord,
    UserStore,
};

fn sample_entry(delta: f64) -> AuditEntry {
    AuditEntry {
        event_id: ScoringEventId::new(),
        builds: vec!["app#3".to_string(), "app#2".to_string()],
        set_digest: AuditDigest::from_bytes(b"app#3,app#2"),
        delta,
        timestamp: Utc::now(),
    }
}

// ===========================================================================
// get_or_create
// ===========================================================================

#[tokio::test]
async fn get_or_create_persists_fresh_record_at_version_one() {
    let store = MemoryUserStore::new();
    let record = store.get_or_create(&UserId::new("alice")).await.unwrap();

    assert_eq!(record.version, 1);
    assert_eq!(record.score, 0.0);
    assert!(record.history.is_empty());

    // A second call returns the same persisted record, not a new one.
    let again = store.get_or_create(&UserId::new("alice")).await.unwrap();
    assert_eq!(again.version, 1);
}

#[tokio::test]
async fn get_or_create_uses_store_default_participation() {
    let undecided = MemoryUserStore::new();
    let record = undecided.get_or_create(&UserId::new("alice")).await.unwrap();
    assert!(!record.participating);

    let opted_in = MemoryUserStore::with_config(StoreConfig {
        participate_by_default: true,
    });
    let record = opted_in.get_or_create(&UserId::new("alice")).await.unwrap();
    assert!(record.participating);
}

#[tokio::test]
async fn racing_get_or_create_calls_converge_on_one_record() {
    let store = Arc::new(MemoryUserStore::new());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.get_or_create(&UserId::new("dave")).await })
        })
        .collect();

    // Every racer gets the same persisted record back, never an error.
    for task in tasks {
        let record = task.await.unwrap().unwrap();
        assert_eq!(record.version, 1);
    }
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_does_not_create() {
    let store = MemoryUserStore::new();
    assert!(store.get(&UserId::new("ghost")).await.unwrap().is_none());
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn ids_are_case_preserving_and_distinct_in_storage() {
    let store = MemoryUserStore::new();
    store.get_or_create(&UserId::new("Alice")).await.unwrap();
    store.get_or_create(&UserId::new("alice")).await.unwrap();

    // The store never collapses case; that is a collection-time policy.
    assert_eq!(store.list().await.unwrap().len(), 2);
}

// ===========================================================================
// save and versioning
// ===========================================================================

#[tokio::test]
async fn save_bumps_version_and_persists_delta() {
    let store = MemoryUserStore::new();
    let mut record = store.get_or_create(&UserId::new("alice")).await.unwrap();
    record.participating = true;
    record.apply_delta(sample_entry(10.0));

    let saved = store.save(record).await.unwrap();
    assert_eq!(saved.version, 2);

    let loaded = store.get(&UserId::new("alice")).await.unwrap().unwrap();
    assert_eq!(loaded.score, 10.0);
    assert_eq!(loaded.history.len(), 1);
}

#[tokio::test]
async fn stale_save_fails_with_version_conflict() {
    let store = MemoryUserStore::new();
    let first = store.get_or_create(&UserId::new("alice")).await.unwrap();
    let second = first.clone();

    // First writer wins.
    let mut winning = first;
    winning.apply_delta(sample_entry(5.0));
    store.save(winning).await.unwrap();

    // Second writer holds the old version and must be rejected.
    let mut losing = second;
    losing.apply_delta(sample_entry(7.0));
    let err = store.save(losing).await.unwrap_err();
    assert!(matches!(err, StorageError::VersionConflict { .. }));

    // The first delta was not overwritten.
    let loaded = store.get(&UserId::new("alice")).await.unwrap().unwrap();
    assert_eq!(loaded.score, 5.0);
}

#[tokio::test]
async fn save_of_unknown_user_fails() {
    let store = MemoryUserStore::new();
    let record = UserScoreRecord::new(UserId::new("ghost"), true);
    let err = store.save(record).await.unwrap_err();
    assert!(matches!(err, StorageError::UserNotFound { .. }));
}

// ===========================================================================
// Concurrency: optimistic retry serializes per-user updates
// ===========================================================================

#[tokio::test]
async fn concurrent_deltas_all_land_via_optimistic_retry() {
    let store = Arc::new(MemoryUserStore::with_config(StoreConfig {
        participate_by_default: true,
    }));
    store.get_or_create(&UserId::new("alice")).await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                loop {
                    let mut record = store.get_or_create(&UserId::new("alice")).await.unwrap();
                    record.apply_delta(sample_entry(1.0));
                    match store.save(record).await {
                        Ok(_) => break,
                        Err(StorageError::VersionConflict { .. }) => continue,
                        Err(e) => panic!("unexpected storage error: {e}"),
                    }
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    let loaded = store.get(&UserId::new("alice")).await.unwrap().unwrap();
    assert_eq!(loaded.score, 16.0);
    assert_eq!(loaded.history.len(), 16);
    let sum: f64 = loaded.history.iter().map(|e| e.delta).sum();
    assert_eq!(loaded.score, sum);
}

// ===========================================================================
// FlakyUserStore
// ===========================================================================

#[tokio::test]
async fn flaky_store_fails_saves_only_for_designated_users() {
    let store = FlakyUserStore::new(
        MemoryUserStore::with_config(StoreConfig {
            participate_by_default: true,
        }),
        vec!["bob".to_string()],
    );

    let mut alice = store.get_or_create(&UserId::new("alice")).await.unwrap();
    alice.apply_delta(sample_entry(3.0));
    store.save(alice).await.unwrap();

    let mut bob = store.get_or_create(&UserId::new("bob")).await.unwrap();
    bob.apply_delta(sample_entry(3.0));
    let err = store.save(bob).await.unwrap_err();
    assert!(matches!(err, StorageError::Backend(_)));
}
