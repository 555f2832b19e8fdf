// Two-document TF-IDF over the business and competitor corpora.
//
// The reference corpus has exactly two documents: the business site's terms
// (A) and every competitor's terms merged into one (B). Competitors are
// scored as one collective voice, not as separate documents, so a term every
// competitor uses is not penalized against the others.
//
//   idf(t)    = ln((1 + n) / (1 + df(t))) + 1        n = 2
//   weight(t) = tf(t, d) * idf(t), then L2-normalized per document
//
// A term both groups use gets idf 1.0; a term only one group uses gets
// idf ~1.405, which is what lets distinctive vocabulary rise to the top.

use std::collections::HashMap;

use tracing::{info, warn};

use super::traits::VocabularyWeighter;
use super::vocabulary::{RankedTerms, WeightedVocabulary, MAX_TERMS};
use crate::error::{PulseError, PulseResult};
use crate::site::Group;

/// Candidate terms extracted from one site.
#[derive(Debug, Clone)]
pub struct SiteTerms {
    pub site: String,
    pub terms: Vec<String>,
}

/// Usable site corpora split by group. Sites without terms are excluded at
/// construction; each group keeps at least one site.
#[derive(Debug, Clone)]
pub struct GroupedCorpus {
    business: Vec<SiteTerms>,
    competitors: Vec<SiteTerms>,
    excluded: Vec<String>,
}

impl GroupedCorpus {
    pub fn new(business: Vec<SiteTerms>, competitors: Vec<SiteTerms>) -> PulseResult<Self> {
        let mut excluded = Vec::new();
        let business = retain_usable(business, &mut excluded);
        let competitors = retain_usable(competitors, &mut excluded);

        if business.is_empty() {
            return Err(PulseError::NoUsableCorpus {
                group: Group::Business,
            });
        }
        if competitors.is_empty() {
            return Err(PulseError::NoUsableCorpus {
                group: Group::Competitors,
            });
        }

        Ok(Self {
            business,
            competitors,
            excluded,
        })
    }

    pub fn sites(&self, group: Group) -> &[SiteTerms] {
        match group {
            Group::Business => &self.business,
            Group::Competitors => &self.competitors,
        }
    }

    /// Sites dropped for having no usable terms.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Term counts for a group's merged document.
    fn term_counts(&self, group: Group) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for site in self.sites(group) {
            for term in &site.terms {
                *counts.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }
}

fn retain_usable(sites: Vec<SiteTerms>, excluded: &mut Vec<String>) -> Vec<SiteTerms> {
    sites
        .into_iter()
        .filter(|site| {
            if site.terms.is_empty() {
                warn!(
                    site = %site.site,
                    error = %PulseError::EmptyCorpus { site: site.site.clone() },
                    "Excluding site from vectorization"
                );
                excluded.push(site.site.clone());
                false
            } else {
                true
            }
        })
        .collect()
}

/// Default vocabulary weighter.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Terms kept per vocabulary.
    pub top_n: usize,
    /// Most frequent terms (across both documents) eligible for weighting.
    pub max_features: usize,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self {
            top_n: MAX_TERMS,
            max_features: 1000,
        }
    }
}

impl TfIdfVectorizer {
    /// Weigh both groups in one pass.
    pub fn vectorize_both(
        &self,
        corpus: &GroupedCorpus,
    ) -> PulseResult<(WeightedVocabulary, WeightedVocabulary)> {
        Ok((
            self.vectorize(corpus, Group::Business)?,
            self.vectorize(corpus, Group::Competitors)?,
        ))
    }

    /// Vocabulary restricted to the `max_features` most frequent terms.
    fn features<'a>(
        &self,
        a: &HashMap<&'a str, usize>,
        b: &HashMap<&'a str, usize>,
    ) -> Vec<&'a str> {
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for (term, count) in a.iter().chain(b.iter()) {
            *totals.entry(*term).or_insert(0) += count;
        }
        let mut ranked: Vec<(&str, usize)> = totals.into_iter().collect();
        ranked.sort_by(|x, y| y.1.cmp(&x.1).then_with(|| x.0.cmp(y.0)));
        ranked.truncate(self.max_features);
        ranked.into_iter().map(|(t, _)| t).collect()
    }
}

impl VocabularyWeighter for TfIdfVectorizer {
    fn vectorize(&self, corpus: &GroupedCorpus, group: Group) -> PulseResult<WeightedVocabulary> {
        let own = corpus.term_counts(group);
        let other = corpus.term_counts(group.other());
        let features = self.features(&own, &other);

        // Two documents in the reference corpus
        let n_docs = 2.0_f64;
        let raw: Vec<(&str, f64)> = features
            .iter()
            .filter_map(|term| {
                let tf = *own.get(term)? as f64;
                let df = 1.0 + if other.contains_key(term) { 1.0 } else { 0.0 };
                let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
                Some((*term, tf * idf))
            })
            .collect();

        let norm = raw.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        let scores = raw.into_iter().map(|(term, w)| {
            let normalized = if norm > 0.0 { w / norm } else { 0.0 };
            (term.to_string(), normalized)
        });

        let terms = RankedTerms::from_scores(scores, self.top_n);

        if let Some((top_term, top_weight)) = terms.iter().next() {
            info!(
                group = %group,
                sites = corpus.sites(group).len(),
                terms = terms.len(),
                top_term,
                top_weight,
                "Computed weighted vocabulary"
            );
        }

        Ok(WeightedVocabulary::new(group, terms))
    }
}
