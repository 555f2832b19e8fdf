// Competitive snapshot pipeline: crawl → normalize → vectorize → differ.
//
// Strategy: parse every input URL into a site, crawl the ones the cache does
// not already hold (several sites at a time), then build one vocabulary for
// the business and one for all competitors together, and finally compute the
// two directional difference sets. Single-site failures are recorded and the
// run continues; cache, configuration and empty-group failures abort it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use crate::cache::atomic::write_json_atomic;
use crate::cache::site_cache::SiteCache;
use crate::config::Config;
use crate::crawl::crawler::{CacheOutcome, CrawlSettings, Crawler};
use crate::crawl::fetcher::PageFetcher;
use crate::error::{PulseError, PulseResult};
use crate::output::render::Renderer;
use crate::site::{Site, SiteRole};
use crate::text::brand::BrandTerms;
use crate::text::normalize::Normalizer;
use crate::topics::difference::{DifferenceRule, DifferenceSet};
use crate::topics::tfidf::{GroupedCorpus, SiteTerms, TfIdfVectorizer};
use crate::topics::vocabulary::{RankedTerms, WeightedVocabulary};

/// Inputs for one run.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRequest {
    pub business_url: String,
    /// Human-readable business name ("Orchestrated Logistics"). Its words are
    /// filtered out like the domain-derived brand terms.
    pub business_name: Option<String>,
    pub competitor_urls: Vec<String>,
    /// Terms removed from every vocabulary, on top of the configured ones.
    pub exclude_terms: Vec<String>,
}

/// How one input site fared.
#[derive(Debug)]
pub enum SiteStatus {
    /// Cached text was reused; nothing was fetched.
    Cached,
    /// Crawled and cached during this run.
    Crawled { pages: usize, failed_pages: usize },
    /// Skipped for this run.
    Failed(PulseError),
}

#[derive(Debug)]
pub struct SiteReport {
    pub input: String,
    pub role: SiteRole,
    pub status: SiteStatus,
}

impl SiteReport {
    pub fn is_usable(&self) -> bool {
        !matches!(self.status, SiteStatus::Failed(_))
    }
}

/// Deterministic output locations for a business.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub business_vocabulary: PathBuf,
    pub competitor_vocabulary: PathBuf,
    pub business_difference: PathBuf,
    pub competitor_difference: PathBuf,
    pub business_image: PathBuf,
    pub competitor_image: PathBuf,
    pub business_difference_image: PathBuf,
    pub competitor_difference_image: PathBuf,
}

impl OutputFiles {
    pub fn for_business(business: &Site, data_dir: &Path, output_dir: &Path) -> Self {
        let prefix = business.file_prefix();
        Self {
            business_vocabulary: data_dir.join(format!("tfidf-{prefix}.json")),
            competitor_vocabulary: data_dir.join(format!("tfidf-{prefix}-competitors.json")),
            business_difference: output_dir.join(format!("diff-{prefix}.json")),
            competitor_difference: output_dir.join(format!("diff-{prefix}-competitors.json")),
            business_image: output_dir.join(format!("wc-{prefix}.png")),
            competitor_image: output_dir.join(format!("wc-{prefix}-competitors.png")),
            business_difference_image: output_dir.join(format!("wc-{prefix}-diff.png")),
            competitor_difference_image: output_dir
                .join(format!("wc-{prefix}-competitors-diff.png")),
        }
    }
}

/// Everything a run produced.
#[derive(Debug)]
pub struct Snapshot {
    pub business: WeightedVocabulary,
    pub competitors: WeightedVocabulary,
    pub business_over_competitors: DifferenceSet,
    pub competitors_over_business: DifferenceSet,
    pub sites: Vec<SiteReport>,
    pub files: OutputFiles,
}

/// Run the whole snapshot. `renderer` is optional; without one only JSON
/// outputs are written.
pub async fn run(
    config: &Config,
    request: &SnapshotRequest,
    fetcher: Arc<dyn PageFetcher>,
    renderer: Option<&dyn Renderer>,
) -> Result<Snapshot> {
    config.validate()?;

    let business = Site::parse(&request.business_url, SiteRole::Business)
        .context("Business URL is not a crawlable site")?;

    let mut reports = Vec::new();
    let competitors = parse_competitors(&business, &request.competitor_urls, &mut reports);

    let cache = SiteCache::open(&config.data_dir)?;
    let crawler = Crawler::new(fetcher, CrawlSettings::from(config));

    let mut all_sites = vec![business.clone()];
    all_sites.extend(competitors);
    let outcomes = crawl_sites(&crawler, &cache, &all_sites, config.site_concurrency).await?;
    reports.extend(outcomes);

    let mut exclude_terms = config.exclude_terms.clone();
    exclude_terms.extend(request.exclude_terms.iter().map(|t| t.to_lowercase()));
    let normalizer = Normalizer::new(&exclude_terms);

    let mut business_brand = BrandTerms::from_domain(business.domain());
    if let Some(name) = &request.business_name {
        business_brand.extend(BrandTerms::from_name(name, |w| normalizer.is_stop_word(w)));
    }
    if business_brand.is_empty() {
        warn!(business = %business, "No brand terms identified for filtering");
    } else {
        info!(count = business_brand.len(), terms = ?business_brand.sorted(), "Brand terms to filter");
    }

    let corpus = build_corpus(&normalizer, &cache, &business_brand, &all_sites, &reports)?;
    for site in corpus.excluded() {
        if let Some(report) = reports.iter_mut().find(|r| r.input == *site) {
            report.status = SiteStatus::Failed(PulseError::EmptyCorpus { site: site.clone() });
        }
    }

    let vectorizer = TfIdfVectorizer::default();
    let (business_vocab, competitor_vocab) = vectorizer.vectorize_both(&corpus)?;
    let (a_over_b, b_over_a) = DifferenceRule::default().differ(&business_vocab, &competitor_vocab);

    let files = OutputFiles::for_business(&business, &config.data_dir, &config.output_dir);
    write_outputs(&files, &config.output_dir, &business_vocab, &competitor_vocab, &a_over_b, &b_over_a)?;

    if let Some(renderer) = renderer {
        render_all(renderer, &files, &business_vocab, &competitor_vocab, &a_over_b, &b_over_a);
    }

    info!(
        business = %business,
        business_terms = business_vocab.terms.len(),
        competitor_terms = competitor_vocab.terms.len(),
        unique_to_business = a_over_b.terms.len(),
        unique_to_competitors = b_over_a.terms.len(),
        "Snapshot complete"
    );

    Ok(Snapshot {
        business: business_vocab,
        competitors: competitor_vocab,
        business_over_competitors: a_over_b,
        competitors_over_business: b_over_a,
        sites: reports,
        files,
    })
}

/// Parse competitor inputs, recording invalid ones. The cache holds one
/// corpus per host, so a competitor on the same host as the business or an
/// earlier competitor is reported as a duplicate and not crawled.
fn parse_competitors(business: &Site, inputs: &[String], reports: &mut Vec<SiteReport>) -> Vec<Site> {
    let mut sites: Vec<Site> = Vec::new();
    for input in inputs {
        let parsed = Site::parse(input, SiteRole::Competitor).and_then(|site| {
            match std::iter::once(business).chain(sites.iter()).find(|s| s.same_cache_entry(&site)) {
                Some(existing) => Err(PulseError::InvalidInput {
                    url: input.clone(),
                    reason: format!("same site as {existing}"),
                }),
                None => Ok(site),
            }
        });

        match parsed {
            Ok(site) => sites.push(site),
            Err(err) => {
                warn!(input = %input, error = %err, "Skipping competitor URL");
                reports.push(SiteReport {
                    input: input.clone(),
                    role: SiteRole::Competitor,
                    status: SiteStatus::Failed(err),
                });
            }
        }
    }
    sites
}

/// Drop sites that share a cache entry with an earlier one, keeping order.
pub fn dedupe_sites(sites: Vec<Site>) -> Vec<Site> {
    let mut kept: Vec<Site> = Vec::with_capacity(sites.len());
    for site in sites {
        if kept.iter().any(|k| k.same_cache_entry(&site)) {
            warn!(site = %site, "Ignoring duplicate site");
            continue;
        }
        kept.push(site);
    }
    kept
}

/// Crawl every site the cache does not hold, up to `site_concurrency` at a
/// time. Results keep the input order. Only run-fatal errors are returned;
/// per-site failures are reported in the site's status.
pub async fn crawl_sites(
    crawler: &Crawler,
    cache: &SiteCache,
    sites: &[Site],
    site_concurrency: usize,
) -> PulseResult<Vec<SiteReport>> {
    let pb = ProgressBar::new(sites.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("  Crawling [{bar:30}] {pos}/{len} {msg}") {
        pb.set_style(style);
    }

    let results: Vec<(&Site, PulseResult<CacheOutcome>)> = stream::iter(sites.iter().map(|site| {
        let pb = &pb;
        async move {
            let outcome = crawler.crawl_into_cache(site, cache).await;
            pb.inc(1);
            (site, outcome)
        }
    }))
    .buffered(site_concurrency.max(1))
    .collect()
    .await;
    pb.finish_and_clear();

    let mut reports = Vec::with_capacity(results.len());
    for (site, outcome) in results {
        let status = match outcome {
            Ok(CacheOutcome::Cached) => SiteStatus::Cached,
            Ok(CacheOutcome::Crawled(report)) => SiteStatus::Crawled {
                pages: report.pages.len(),
                failed_pages: report.failures.len(),
            },
            Err(err) if err.is_fatal() => {
                error!(site = %site, error = %err, "Aborting run");
                return Err(err);
            }
            Err(err) => {
                warn!(site = %site, error = %err, "Site excluded from this run");
                SiteStatus::Failed(err)
            }
        };
        reports.push(SiteReport {
            input: site.identifier().to_string(),
            role: site.role(),
            status,
        });
    }
    Ok(reports)
}

/// Normalize each usable site's cached text into candidate terms. Every site
/// is filtered with the business brand plus its own domain brand.
fn build_corpus(
    normalizer: &Normalizer,
    cache: &SiteCache,
    business_brand: &BrandTerms,
    sites: &[Site],
    reports: &[SiteReport],
) -> PulseResult<GroupedCorpus> {
    let mut business_terms = Vec::new();
    let mut competitor_terms = Vec::new();

    for site in sites {
        let usable = reports
            .iter()
            .any(|r| r.input == site.identifier() && r.is_usable());
        if !usable {
            continue;
        }

        let text = cache.load(site)?;
        let mut brand = business_brand.clone();
        brand.extend(BrandTerms::from_domain(site.domain()));
        let terms = SiteTerms {
            site: site.identifier().to_string(),
            terms: normalizer.analyze(&text, &brand),
        };

        match site.role() {
            SiteRole::Business => business_terms.push(terms),
            SiteRole::Competitor => competitor_terms.push(terms),
        }
    }

    GroupedCorpus::new(business_terms, competitor_terms)
}

fn write_outputs(
    files: &OutputFiles,
    output_dir: &Path,
    business: &WeightedVocabulary,
    competitors: &WeightedVocabulary,
    a_over_b: &DifferenceSet,
    b_over_a: &DifferenceSet,
) -> PulseResult<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| PulseError::cache_io(output_dir, e))?;

    write_json_atomic(&files.business_vocabulary, &business.terms)?;
    write_json_atomic(&files.competitor_vocabulary, &competitors.terms)?;
    write_json_atomic(&files.business_difference, &a_over_b.terms)?;
    write_json_atomic(&files.competitor_difference, &b_over_a.terms)?;

    info!(
        business = %files.business_vocabulary.display(),
        competitors = %files.competitor_vocabulary.display(),
        "Weighted vocabularies saved"
    );
    Ok(())
}

/// Hand each mapping to the renderer. Rendering problems never fail the run.
fn render_all(
    renderer: &dyn Renderer,
    files: &OutputFiles,
    business: &WeightedVocabulary,
    competitors: &WeightedVocabulary,
    a_over_b: &DifferenceSet,
    b_over_a: &DifferenceSet,
) {
    let jobs: [(&RankedTerms, &PathBuf); 4] = [
        (&business.terms, &files.business_image),
        (&competitors.terms, &files.competitor_image),
        (&a_over_b.terms, &files.business_difference_image),
        (&b_over_a.terms, &files.competitor_difference_image),
    ];

    for (terms, path) in jobs {
        match renderer.render(terms, path) {
            Ok(()) => info!(path = %path.display(), "Rendered image"),
            Err(e) => warn!(path = %path.display(), error = %e, "Renderer failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_names() {
        let business = Site::parse("https://www.getorchestrated.com", SiteRole::Business).unwrap();
        let files = OutputFiles::for_business(&business, Path::new("data"), Path::new("output"));
        assert_eq!(
            files.business_vocabulary,
            Path::new("data/tfidf-www_getorchestrated_com.json")
        );
        assert_eq!(
            files.competitor_vocabulary,
            Path::new("data/tfidf-www_getorchestrated_com-competitors.json")
        );
        assert_eq!(
            files.business_difference_image,
            Path::new("output/wc-www_getorchestrated_com-diff.png")
        );
    }

    #[test]
    fn test_parse_competitors_skips_invalid_and_duplicates() {
        let business = Site::parse("acme.test", SiteRole::Business).unwrap();
        let mut reports = Vec::new();
        let inputs = vec![
            "rival.test".to_string(),
            "ftp://bad.test".to_string(),
            "https://rival.test/en".to_string(),
            "https://www.acme.test/about".to_string(),
        ];
        let sites = parse_competitors(&business, &inputs, &mut reports);

        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].identifier(), "https://rival.test/");
        let skipped: Vec<&str> = reports.iter().map(|r| r.input.as_str()).collect();
        assert_eq!(
            skipped,
            vec!["ftp://bad.test", "https://rival.test/en", "https://www.acme.test/about"]
        );
        assert!(reports
            .iter()
            .all(|r| matches!(r.status, SiteStatus::Failed(PulseError::InvalidInput { .. }))));
    }

    #[test]
    fn test_dedupe_sites_by_cache_entry() {
        let sites = vec![
            Site::parse("acme.test", SiteRole::Business).unwrap(),
            Site::parse("acme.test/pricing", SiteRole::Business).unwrap(),
            Site::parse("rival.test", SiteRole::Business).unwrap(),
        ];
        let kept = dedupe_sites(sites);
        let ids: Vec<&str> = kept.iter().map(|s| s.identifier()).collect();
        assert_eq!(ids, vec!["https://acme.test/", "https://rival.test/"]);
    }
}
