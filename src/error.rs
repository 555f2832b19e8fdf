// Typed failures for the crawl, cache and vectorization layers.
//
// Page-level and single-site failures are isolated by the pipeline; cache,
// configuration and whole-group failures abort the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::site::Group;

/// Failures surfaced by the snapshot pipeline.
#[derive(Debug, Error)]
pub enum PulseError {
    /// A seed or competitor URL could not be parsed into a crawlable site.
    #[error("invalid site URL {url:?}: {reason}")]
    InvalidInput { url: String, reason: String },

    /// A page fetch failed even after its retry.
    #[error("transient fetch failure for {url}: {reason}")]
    TransientFetch { url: String, reason: String },

    /// The seed page could not be fetched, so the whole site is skipped.
    #[error("site unreachable: {site} ({reason})")]
    SiteUnreachable { site: String, reason: String },

    /// The cache directory could not be read or written.
    #[error("cache I/O failed at {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A site produced no usable text after extraction or filtering.
    #[error("no usable text for {site}")]
    EmptyCorpus { site: String },

    /// Every site in a group was excluded, so it cannot be weighted.
    #[error("no usable corpus left for group {group}")]
    NoUsableCorpus { group: Group },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PulseError {
    /// Whether this failure must abort the whole run rather than one site.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PulseError::CacheIo { .. } | PulseError::Config(_) | PulseError::NoUsableCorpus { .. }
        )
    }

    pub(crate) fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PulseError::CacheIo {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a single page fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Network error, timeout, 5xx or 429. Worth one retry.
    #[error("transient: {0}")]
    Transient(String),

    /// 4xx or non-HTML content. Retrying will not help.
    #[error("permanent: {0}")]
    Permanent(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

pub type PulseResult<T> = std::result::Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_split() {
        let io = PulseError::cache_io("/tmp/x", std::io::Error::other("disk full"));
        assert!(io.is_fatal());
        assert!(PulseError::Config("bad".into()).is_fatal());
        assert!(PulseError::NoUsableCorpus { group: Group::Competitors }.is_fatal());

        assert!(!PulseError::EmptyCorpus { site: "a".into() }.is_fatal());
        assert!(!PulseError::SiteUnreachable {
            site: "a".into(),
            reason: "timeout".into()
        }
        .is_fatal());
        assert!(!PulseError::InvalidInput {
            url: "::".into(),
            reason: "no host".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_fetch_error_transience() {
        assert!(FetchError::Transient("timeout".into()).is_transient());
        assert!(!FetchError::Permanent("HTTP 404".into()).is_transient());
    }
}
