//! Score cards: the immutable result of scoring one build.

use serde::{Deserialize, Serialize};

/// Points awarded (or deducted) by one rule for one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Name of the rule that produced these points.
    pub rule: String,
    /// Signed points.
    pub points: f64,
    /// Optional human-readable explanation.
    pub description: Option<String>,
}

impl ScoreEntry {
    pub fn new(rule: impl Into<String>, points: f64) -> Self {
        Self {
            rule: rule.into(),
            points,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The score computed for one build.
///
/// Once produced a card is never recomputed or mutated; the total
/// always equals the sum of its entries' points. A total of exactly 0
/// is legitimate (no rule matched) and means no ledger update happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub total: f64,
    pub entries: Vec<ScoreEntry>,
}

impl ScoreCard {
    /// Build a card from rule results, computing the total.
    pub fn from_entries(entries: Vec<ScoreEntry>) -> Self {
        let total = entries.iter().map(|e| e.points).sum();
        Self { total, entries }
    }

    /// Card with no entries and a total of 0.
    pub fn empty() -> Self {
        Self {
            total: 0.0,
            entries: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries_computes_total() {
        let card = ScoreCard::from_entries(vec![
            ScoreEntry::new("build fixed", 10.0),
            ScoreEntry::new("new warnings", -2.5),
        ]);
        assert_eq!(card.total, 7.5);
        assert_eq!(card.entries.len(), 2);
    }

    #[test]
    fn test_empty_card_scores_zero() {
        let card = ScoreCard::empty();
        assert_eq!(card.total, 0.0);
        assert!(card.entries.is_empty());
    }

    #[test]
    fn test_score_card_serde_round_trip() {
        let card = ScoreCard::from_entries(vec![
            ScoreEntry::new("tests added", 3.0).with_description("2 new tests")
        ]);
        let json = serde_json::to_string(&card).expect("serialize");
        let back: ScoreCard = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(card, back);
    }
}
