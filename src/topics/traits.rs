// Vocabulary weighter trait — swap-ready abstraction.
//
// The default implementation is two-document TF-IDF, but any model that turns
// the grouped corpus into per-group term weights can slot in here without
// touching the crawl or differencing stages.

use super::tfidf::GroupedCorpus;
use super::vocabulary::WeightedVocabulary;
use crate::error::PulseResult;
use crate::site::Group;

/// Produces the weighted vocabulary of one group.
pub trait VocabularyWeighter {
    /// Weigh `group`'s terms against the whole grouped corpus.
    fn vectorize(&self, corpus: &GroupedCorpus, group: Group) -> PulseResult<WeightedVocabulary>;
}
