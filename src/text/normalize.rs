// Tokenization and vocabulary filtering.
//
// Turns cached site text into the candidate terms the vectorizer weighs:
// lowercase alphabetic tokens with stop words, brand terms and user
// exclusions removed, plus the adjacent-token phrases built from them.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

use super::brand::BrandTerms;

/// Longest phrase (in tokens) the vectorizer considers.
pub const MAX_NGRAM: usize = 2;

/// Tokens shorter than this carry no vocabulary signal.
const MIN_TOKEN_CHARS: usize = 2;

/// Stateless apart from its word lists; build once per run.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stop_words: HashSet<String>,
    /// User exclusions: single words and space-joined phrases.
    excluded: HashSet<String>,
    max_ngram: usize,
}

impl Normalizer {
    /// English stop words plus `extra_excludes` (lowercased).
    pub fn new(extra_excludes: &[String]) -> Self {
        let stop_words: HashSet<String> = get(LANGUAGE::English)
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();
        let excluded = extra_excludes
            .iter()
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            stop_words,
            excluded,
            max_ngram: MAX_NGRAM,
        }
    }

    /// Filtered token sequence for `raw_text`.
    pub fn normalize(&self, raw_text: &str, brand: &BrandTerms) -> Vec<String> {
        raw_text
            .to_lowercase()
            .split(|c: char| !c.is_alphabetic())
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .filter(|token| !self.stop_words.contains(*token))
            .filter(|token| !brand.contains(token) && !self.excluded.contains(*token))
            .map(str::to_string)
            .collect()
    }

    /// Candidate vocabulary: every token plus every run of up to
    /// `MAX_NGRAM` adjacent tokens, minus excluded phrases.
    pub fn candidate_terms(&self, tokens: &[String], brand: &BrandTerms) -> Vec<String> {
        let mut terms: Vec<String> = tokens.to_vec();

        for n in 2..=self.max_ngram {
            for window in tokens.windows(n) {
                let phrase = window.join(" ");
                if brand.contains(&phrase) || self.excluded.contains(&phrase) {
                    continue;
                }
                terms.push(phrase);
            }
        }

        terms
    }

    /// `normalize` followed by `candidate_terms`.
    pub fn analyze(&self, raw_text: &str, brand: &BrandTerms) -> Vec<String> {
        let tokens = self.normalize(raw_text, brand);
        self.candidate_terms(&tokens, brand)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&[])
    }
}
