//! Participant collection: from accountable builds to the set of users
//! who share the score.

use std::collections::HashSet;
use std::sync::Arc;

use cigame_state::{StorageResult, UserStore};
use serde::{Deserialize, Serialize};

use crate::changelog::ChangeLogSource;
use crate::domain::User;
use crate::resolver::AccountableBuildSet;

/// How user ids are compared when deduplicating participants.
///
/// An explicit strategy value instead of an optional comparator: hosts
/// with case-insensitive user ids collapse `Alice` and `alice` into one
/// participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    /// Ids are distinct unless byte-identical.
    Exact,
    /// Ids collapse when equal ignoring ASCII case; the first
    /// identity encountered in build order represents the group.
    IgnoreCase,
}

impl CaseSensitivity {
    fn key(&self, id: &str) -> String {
        match self {
            CaseSensitivity::Exact => id.to_string(),
            CaseSensitivity::IgnoreCase => id.to_ascii_lowercase(),
        }
    }
}

/// Collects the participating users of a scoring event.
pub struct ParticipantCollector {
    changelog: Arc<dyn ChangeLogSource>,
}

impl ParticipantCollector {
    pub fn new(changelog: Arc<dyn ChangeLogSource>) -> Self {
        Self { changelog }
    }

    /// Union of change-log authors across the accountable builds, in
    /// build order, deduplicated under the given policy.
    pub async fn collect(
        &self,
        set: &AccountableBuildSet,
        case_sensitivity: CaseSensitivity,
    ) -> Vec<User> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut participants = Vec::new();

        for build in set.builds() {
            for author in self.changelog.authors_of(build).await {
                if seen.insert(case_sensitivity.key(author.id.as_str())) {
                    participants.push(author);
                }
            }
        }

        participants
    }

    /// The participant list exposed for display: collected as above,
    /// filtered to users who have opted into the game, sorted by
    /// display name ignoring case.
    pub async fn display_roster(
        &self,
        set: &AccountableBuildSet,
        case_sensitivity: CaseSensitivity,
        store: &dyn UserStore,
    ) -> StorageResult<Vec<User>> {
        let mut roster = Vec::new();
        for user in self.collect(set, case_sensitivity).await {
            if let Some(record) = store.get(&user.id).await? {
                if record.participating {
                    roster.push(user);
                }
            }
        }
        roster.sort_by(|a, b| {
            a.display_name
                .to_ascii_lowercase()
                .cmp(&b.display_name.to_ascii_lowercase())
        });
        Ok(roster)
    }
}
