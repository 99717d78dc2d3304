//! Score ledger: applying a computed score to every participant's
//! persistent record.

use std::sync::Arc;

use chrono::Utc;
use cigame_state::{AuditEntry, ScoringEventId, StorageError, UserStore};
use tracing::{debug, info};

use crate::domain::{Result, User};
use crate::listener::Listener;
use crate::resolver::AccountableBuildSet;

/// Retry budget for optimistic save conflicts. Conflicts only happen
/// when two scoring events name the same user at the same moment, so a
/// handful of retries is plenty.
pub const DEFAULT_SAVE_RETRIES: u32 = 5;

/// Applies score deltas to persistent user records.
pub struct ScoreLedger {
    store: Arc<dyn UserStore>,
    save_retries: u32,
}

impl ScoreLedger {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            save_retries: DEFAULT_SAVE_RETRIES,
        }
    }

    pub fn with_save_retries(mut self, save_retries: u32) -> Self {
        self.save_retries = save_retries;
        self
    }

    /// Distribute `total` to every participant's record.
    ///
    /// A zero total never touches storage. Otherwise each participant's
    /// record is loaded or lazily created; only participating users are
    /// mutated (delta added, one audit entry appended). The read-modify-
    /// write cycle is serialized per user by retrying on version
    /// conflicts against the latest persisted state.
    ///
    /// A non-conflict storage failure halts the remaining participants;
    /// updates already applied stay applied. Returns whether the
    /// participant list was non-empty.
    pub async fn apply(
        &self,
        participants: &[User],
        total: f64,
        set: &AccountableBuildSet,
        listener: &dyn Listener,
    ) -> Result<bool> {
        if total == 0.0 {
            debug!("score is zero, leaving user records untouched");
            return Ok(false);
        }

        let event_id = ScoringEventId::new();
        for user in participants {
            self.apply_one(user, total, set, &event_id, listener).await?;
        }

        Ok(!participants.is_empty())
    }

    async fn apply_one(
        &self,
        user: &User,
        delta: f64,
        set: &AccountableBuildSet,
        event_id: &ScoringEventId,
        listener: &dyn Listener,
    ) -> Result<()> {
        let mut attempt = 0;
        loop {
            let mut record = self.store.get_or_create(&user.id).await?;

            if !record.participating {
                listener.info(&format!(
                    "{} is not participating in the game, score unchanged",
                    user.display_name
                ));
                return Ok(());
            }

            record.apply_delta(AuditEntry {
                event_id: event_id.clone(),
                builds: set.refs(),
                set_digest: set.digest(),
                delta,
                timestamp: Utc::now(),
            });
            let new_score = record.score;

            match self.store.save(record).await {
                Ok(_) => {
                    info!(user = %user.id, delta, score = new_score, "score applied");
                    listener.info(&format!(
                        "{} scored {delta:+} points, now at {new_score}",
                        user.display_name
                    ));
                    return Ok(());
                }
                Err(StorageError::VersionConflict { .. }) if attempt < self.save_retries => {
                    attempt += 1;
                    debug!(user = %user.id, attempt, "concurrent update, reloading record");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
