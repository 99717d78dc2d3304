//! Rule evaluation: turning a build into a score card.
//!
//! What earns points is the rule book's business, not the engine's.
//! This module only defines the evaluation contract and the
//! deterministic loop that produces an immutable `ScoreCard`.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Build, GameError, Result, ScoreCard, ScoreEntry};
use crate::listener::Listener;

/// One scoring rule.
///
/// `evaluate` must be deterministic for a fixed build state: the same
/// build always yields the same outcome. `Ok(None)` means the rule does
/// not apply to this build.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, build: &Build) -> std::result::Result<Option<ScoreEntry>, String>;
}

/// An ordered collection of rules evaluated together.
#[derive(Clone, Default)]
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<Arc<dyn Rule>>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Evaluates a rule set against a completed build.
pub struct ScoreComputer;

impl ScoreComputer {
    /// Compute the score card for `build`.
    ///
    /// A rule that fails to evaluate contributes 0 points and is
    /// reported through the listener; only a build without a finalized
    /// result aborts the whole computation.
    pub fn compute(build: &Build, rule_set: &RuleSet, listener: &dyn Listener) -> Result<ScoreCard> {
        if build.result.is_none() {
            return Err(GameError::Computation(format!(
                "build {} has no finalized result",
                build.id
            )));
        }

        let mut entries = Vec::new();
        for rule in &rule_set.rules {
            match rule.evaluate(build) {
                Ok(Some(entry)) => {
                    debug!(build = %build.id, rule = rule.name(), points = entry.points, "rule matched");
                    entries.push(entry);
                }
                Ok(None) => {}
                Err(reason) => {
                    listener.warn(&format!(
                        "rule '{}' failed for {}: {reason}",
                        rule.name(),
                        build.id
                    ));
                }
            }
        }

        Ok(ScoreCard::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BuildId, BuildResult};
    use crate::listener::MemoryListener;

    struct FixedRule {
        name: String,
        points: f64,
    }

    impl Rule for FixedRule {
        fn name(&self) -> &str {
            &self.name
        }

        fn evaluate(&self, _build: &Build) -> std::result::Result<Option<ScoreEntry>, String> {
            Ok(Some(ScoreEntry::new(self.name.clone(), self.points)))
        }
    }

    struct BrokenRule;

    impl Rule for BrokenRule {
        fn name(&self) -> &str {
            "broken"
        }

        fn evaluate(&self, _build: &Build) -> std::result::Result<Option<ScoreEntry>, String> {
            Err("rule state unavailable".to_string())
        }
    }

    fn fixed(name: &str, points: f64) -> Arc<dyn Rule> {
        Arc::new(FixedRule {
            name: name.to_string(),
            points,
        })
    }

    #[test]
    fn test_compute_sums_matching_rules() {
        let build = Build::new(BuildId::new("app", 1), BuildResult::Success);
        let rules = RuleSet::new("default")
            .with_rule(fixed("build succeeded", 1.0))
            .with_rule(fixed("tests added", 2.0));
        let listener = MemoryListener::new();

        let card = ScoreComputer::compute(&build, &rules, &listener).unwrap();
        assert_eq!(card.total, 3.0);
        assert_eq!(card.entries.len(), 2);
    }

    #[test]
    fn test_failing_rule_contributes_zero_and_warns() {
        let build = Build::new(BuildId::new("app", 1), BuildResult::Failure);
        let rules = RuleSet::new("default")
            .with_rule(Arc::new(BrokenRule))
            .with_rule(fixed("build failed", -4.0));
        let listener = MemoryListener::new();

        let card = ScoreComputer::compute(&build, &rules, &listener).unwrap();
        assert_eq!(card.total, -4.0);
        assert_eq!(listener.messages().len(), 1);
        assert!(listener.messages()[0].contains("broken"));
    }

    #[test]
    fn test_unfinished_build_is_a_computation_error() {
        let mut build = Build::new(BuildId::new("app", 1), BuildResult::Success);
        build.result = None;
        let listener = MemoryListener::new();

        let err = ScoreComputer::compute(&build, &RuleSet::new("default"), &listener).unwrap_err();
        assert!(matches!(err, GameError::Computation(_)));
    }

    #[test]
    fn test_empty_rule_set_scores_zero() {
        let build = Build::new(BuildId::new("app", 1), BuildResult::Success);
        let listener = MemoryListener::new();

        let card = ScoreComputer::compute(&build, &RuleSet::new("empty"), &listener).unwrap();
        assert_eq!(card.total, 0.0);
    }
}
