//! Scoring orchestration on build completion.
//!
//! `GamePublisher` wires the engine together: compute the score card,
//! resolve the accountable builds, collect participants, apply the
//! ledger update, and attach the result to the build for display.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::info;

use cigame_state::UserStore;

use crate::changelog::ChangeLogSource;
use crate::collector::{CaseSensitivity, ParticipantCollector};
use crate::domain::{Build, BuildId, Result, ScoreCard, User};
use crate::graph::BuildGraph;
use crate::ledger::ScoreLedger;
use crate::listener::Listener;
use crate::resolver::{AccountabilityResolver, DEFAULT_UPSTREAM_DEPTH_LIMIT};
use crate::rules::{RuleSet, ScoreComputer};

/// Engine configuration, passed in explicitly instead of being read
/// from a host-wide descriptor registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameConfig {
    /// How user ids are compared when deduplicating participants.
    pub case_sensitivity: CaseSensitivity,
    /// Bound on the upstream-cause walk.
    pub upstream_depth_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            case_sensitivity: CaseSensitivity::Exact,
            upstream_depth_limit: DEFAULT_UPSTREAM_DEPTH_LIMIT,
        }
    }
}

/// Read-only artifact attached to a build after scoring: the card, the
/// builds it was computed from, and the displayable participant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCardAttachment {
    pub build: BuildId,
    pub score_card: ScoreCard,
    /// Display references of the accountable builds.
    pub accountable_builds: Vec<String>,
    /// Opted-in participants, sorted by display name ignoring case.
    pub participants: Vec<User>,
    pub recorded_at: DateTime<Utc>,
}

/// Orchestrates one scoring event per completed build.
pub struct GamePublisher {
    config: GameConfig,
    resolver: AccountabilityResolver,
    collector: ParticipantCollector,
    ledger: ScoreLedger,
    store: Arc<dyn UserStore>,
    /// One cell per build; concurrent deliveries of the same completion
    /// race on the cell, not on the ledger.
    attachments: Mutex<HashMap<BuildId, Arc<OnceCell<Arc<ScoreCardAttachment>>>>>,
}

impl GamePublisher {
    pub fn new(
        config: GameConfig,
        graph: Arc<dyn BuildGraph>,
        changelog: Arc<dyn ChangeLogSource>,
        store: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            resolver: AccountabilityResolver::new(graph)
                .with_depth_limit(config.upstream_depth_limit),
            collector: ParticipantCollector::new(changelog),
            ledger: ScoreLedger::new(store.clone()),
            store,
            attachments: Mutex::new(HashMap::new()),
        }
    }

    /// Score a finalized build.
    ///
    /// Must be invoked with the final result, once per build; invoking
    /// it again for an already-scored build returns the existing
    /// attachment without recomputing anything.
    pub async fn on_build_complete(
        &self,
        build: &Build,
        rule_set: &RuleSet,
        listener: &dyn Listener,
    ) -> Result<Arc<ScoreCardAttachment>> {
        let cell = {
            let mut attachments = self.attachments.lock().unwrap();
            attachments.entry(build.id.clone()).or_default().clone()
        };

        if let Some(existing) = cell.get() {
            listener.info(&format!("{} has already been scored", build.id));
            return Ok(existing.clone());
        }

        // Losers of a concurrent delivery race wait for the winner's
        // attachment here instead of re-running the ledger. A failed
        // scoring attempt leaves the cell unset, so the build can be
        // rescored after the fault clears.
        let attachment = cell
            .get_or_try_init(|| self.score(build, rule_set, listener))
            .await?;
        Ok(attachment.clone())
    }

    async fn score(
        &self,
        build: &Build,
        rule_set: &RuleSet,
        listener: &dyn Listener,
    ) -> Result<Arc<ScoreCardAttachment>> {
        let score_card = ScoreComputer::compute(build, rule_set, listener)?;
        info!(build = %build.id, total = score_card.total, "score card computed");

        let set = self.resolver.resolve(build).await;
        listener.info(&format!(
            "accountable builds for {}: {}",
            build.id,
            set.refs().join(", ")
        ));

        let participants = self
            .collector
            .collect(&set, self.config.case_sensitivity)
            .await;

        let touched = self
            .ledger
            .apply(&participants, score_card.total, &set, listener)
            .await?;
        info!(
            build = %build.id,
            participants = participants.len(),
            touched,
            "ledger update finished"
        );

        let roster = self
            .collector
            .display_roster(&set, self.config.case_sensitivity, self.store.as_ref())
            .await?;

        Ok(Arc::new(ScoreCardAttachment {
            build: build.id.clone(),
            score_card,
            accountable_builds: set.refs(),
            participants: roster,
            recorded_at: Utc::now(),
        }))
    }

    /// The attachment recorded for a build, if it has been scored.
    pub fn attachment(&self, id: &BuildId) -> Option<Arc<ScoreCardAttachment>> {
        let attachments = self.attachments.lock().unwrap();
        attachments.get(id).and_then(|cell| cell.get()).cloned()
    }
}
