// Renderer boundary.
//
// Turning a term → weight mapping into an image lives outside this crate.
// The pipeline hands every renderer a mapping that is already capped at
// `MAX_TERMS` entries with positive weights, plus the path to write.

use std::path::Path;

use anyhow::Result;

use crate::topics::vocabulary::RankedTerms;

/// Draws a weighted term mapping to `output_path` as an 800x600 image.
pub trait Renderer: Send + Sync {
    fn render(&self, terms: &RankedTerms, output_path: &Path) -> Result<()>;
}
