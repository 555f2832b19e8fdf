// Vocabulary weighting — TF-IDF per group and directional differences.

pub mod difference;
pub mod tfidf;
pub mod traits;
pub mod vocabulary;
