// Ranked term → weight mappings.
//
// Both weighted vocabularies and difference sets are capped, ordered by weight
// descending with ties broken alphabetically, and serialize as a JSON object
// in that order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use colored::Colorize;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::site::Group;

/// Cap on terms kept in any vocabulary or difference set.
pub const MAX_TERMS: usize = 100;

/// Terms ordered by weight descending, then term ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedTerms {
    entries: Vec<(String, f64)>,
}

impl RankedTerms {
    /// Rank `scores`, keeping at most `cap` strictly positive, finite entries.
    pub fn from_scores(scores: impl IntoIterator<Item = (String, f64)>, cap: usize) -> Self {
        let mut entries: Vec<(String, f64)> = scores
            .into_iter()
            .filter(|(_, w)| w.is_finite() && *w > 0.0)
            .collect();
        entries.sort_by(rank_order);
        entries.truncate(cap);
        Self { entries }
    }

    /// Weight of `term`, or 0.0 when absent.
    pub fn weight(&self, term: &str) -> f64 {
        self.get(term).unwrap_or(0.0)
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, w)| *w)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.get(term).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn rank_order(a: &(String, f64), b: &(String, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

impl Serialize for RankedTerms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(t, w)| (t, w)))
    }
}

impl<'de> Deserialize<'de> for RankedTerms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = HashMap::<String, f64>::deserialize(deserializer)?;
        Ok(Self::from_scores(map, MAX_TERMS))
    }
}

/// Top terms for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedVocabulary {
    pub group: Group,
    pub terms: RankedTerms,
}

impl WeightedVocabulary {
    pub fn new(group: Group, terms: RankedTerms) -> Self {
        Self { group, terms }
    }

    /// Build from literal pairs, applying the usual ranking and cap.
    pub fn from_pairs(group: Group, pairs: &[(&str, f64)]) -> Self {
        let scores = pairs.iter().map(|(t, w)| (t.to_string(), *w));
        Self::new(group, RankedTerms::from_scores(scores, MAX_TERMS))
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.terms.weight(term)
    }

    /// Display the top `limit` terms as a bar chart in the terminal.
    pub fn display(&self, title: &str, limit: usize) {
        display_ranked(title, &self.terms, limit);
    }
}

impl fmt::Display for WeightedVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vocabulary ({} terms)", self.group, self.terms.len())
    }
}

/// Shared bar-chart rendering for vocabularies and difference sets.
pub(crate) fn display_ranked(title: &str, terms: &RankedTerms, limit: usize) {
    println!("\n{}", format!("=== {title} ===").bold());
    println!();

    if terms.is_empty() {
        println!("  {}", "(no terms)".dimmed());
        return;
    }

    let bar_width: usize = 20;
    let top = terms.iter().next().map(|(_, w)| w).unwrap_or(1.0);

    for (i, (term, weight)) in terms.iter().take(limit).enumerate() {
        let relative = if top > 0.0 { weight / top } else { 0.0 };
        let filled = (relative * bar_width as f64).round() as usize;
        let empty = bar_width.saturating_sub(filled);
        let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(empty));

        let colored_bar = if relative >= 0.66 {
            bar.bright_green()
        } else if relative >= 0.33 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!("  {:>3}. {:<32} {} {:.3}", i + 1, term.bold(), colored_bar, weight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_and_tie_break() {
        let ranked = RankedTerms::from_scores(
            vec![
                ("zeta".to_string(), 0.5),
                ("alpha".to_string(), 0.5),
                ("mid".to_string(), 0.7),
                ("low".to_string(), 0.1),
            ],
            MAX_TERMS,
        );
        let order: Vec<&str> = ranked.terms().collect();
        assert_eq!(order, vec!["mid", "alpha", "zeta", "low"]);
    }

    #[test]
    fn test_cap_and_non_positive_dropped() {
        let scores = (0..150).map(|i| (format!("t{i:03}"), 1.0 + i as f64));
        let ranked = RankedTerms::from_scores(scores, MAX_TERMS);
        assert_eq!(ranked.len(), MAX_TERMS);
        assert_eq!(ranked.terms().next(), Some("t149"));

        let ranked = RankedTerms::from_scores(
            vec![
                ("zero".to_string(), 0.0),
                ("neg".to_string(), -0.2),
                ("nan".to_string(), f64::NAN),
                ("ok".to_string(), 0.3),
            ],
            MAX_TERMS,
        );
        assert_eq!(ranked.terms().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn test_serializes_in_rank_order() {
        let vocab = WeightedVocabulary::from_pairs(
            Group::Business,
            &[("beta", 0.25), ("alpha", 0.5)],
        );
        let json = serde_json::to_string(&vocab.terms).unwrap();
        assert_eq!(json, r#"{"alpha":0.5,"beta":0.25}"#);

        let back: RankedTerms = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vocab.terms);
    }

    #[test]
    fn test_weight_defaults_to_zero() {
        let vocab = WeightedVocabulary::from_pairs(Group::Competitors, &[("warranty", 0.3)]);
        assert_eq!(vocab.weight("warranty"), 0.3);
        assert_eq!(vocab.weight("missing"), 0.0);
    }
}
