// Directional difference between two weighted vocabularies.
//
// A term belongs to the A-over-B set when B does not use it at all, or when
// A's weight is at least `ratio` times B's. Its difference weight is
// `a - max(b, 0)` and it is kept only above `floor`. B-over-A is the same
// rule with the roles swapped. For positive weights the ratio test cannot
// hold in both directions, so no term lands in both sets.

use serde::Serialize;

use super::vocabulary::{display_ranked, RankedTerms, WeightedVocabulary, MAX_TERMS};
use crate::site::Group;

/// Terms where one group dominates the other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceSet {
    /// The group whose weight dominates.
    pub dominant: Group,
    pub terms: RankedTerms,
}

impl DifferenceSet {
    pub fn display(&self, title: &str, limit: usize) {
        display_ranked(title, &self.terms, limit);
    }
}

/// Thresholds for the difference rule.
#[derive(Debug, Clone)]
pub struct DifferenceRule {
    /// Minimum dominant/other weight ratio for shared terms.
    pub ratio: f64,
    /// Difference weights at or below this are dropped.
    pub floor: f64,
    pub cap: usize,
}

impl Default for DifferenceRule {
    fn default() -> Self {
        Self {
            ratio: 4.0,
            floor: 0.01,
            cap: MAX_TERMS,
        }
    }
}

impl DifferenceRule {
    /// Difference weight of a term with `dominant` and `other` weights, if
    /// it qualifies.
    pub fn score(&self, dominant: f64, other: f64) -> Option<f64> {
        let other = other.max(0.0);
        let eligible = other == 0.0 || dominant >= self.ratio * other;
        if !eligible {
            return None;
        }
        let diff = dominant - other;
        (diff > self.floor).then_some(diff)
    }

    /// Terms of `dominant` that dominate `other`.
    pub fn one_way(&self, dominant: &WeightedVocabulary, other: &WeightedVocabulary) -> DifferenceSet {
        let scores = dominant.terms.iter().filter_map(|(term, weight)| {
            self.score(weight, other.weight(term))
                .map(|diff| (term.to_string(), diff))
        });
        DifferenceSet {
            dominant: dominant.group,
            terms: RankedTerms::from_scores(scores, self.cap),
        }
    }

    /// Both directions: (A over B, B over A).
    pub fn differ(
        &self,
        a: &WeightedVocabulary,
        b: &WeightedVocabulary,
    ) -> (DifferenceSet, DifferenceSet) {
        (self.one_way(a, b), self.one_way(b, a))
    }
}

/// Differences with the default 4x ratio and 0.01 floor.
pub fn differ(a: &WeightedVocabulary, b: &WeightedVocabulary) -> (DifferenceSet, DifferenceSet) {
    DifferenceRule::default().differ(a, b)
}
