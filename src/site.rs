// Sites, groups and URL canonicalization.
//
// A site is identified by the canonical form of its root URL. The same
// canonical form, minus any leading `www.`, is the crawler's dedup key, and a
// sanitized version of the host names every file the pipeline writes for that
// site.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PulseError, PulseResult};

/// Query parameters that only track campaigns and never change page content.
const TRACKING_PARAMS: &[&str] = &["gclid", "fbclid", "msclkid", "mc_cid", "mc_eid", "ref"];

/// Separator used when turning a host into a file-name prefix.
pub const FILE_SEPARATOR: char = '_';

/// Whose site this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteRole {
    Business,
    Competitor,
}

/// The two vocabularies being compared: A (business) and B (competitors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Business,
    Competitors,
}

impl Group {
    pub fn other(self) -> Group {
        match self {
            Group::Business => Group::Competitors,
            Group::Competitors => Group::Business,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Business => write!(f, "business"),
            Group::Competitors => write!(f, "competitors"),
        }
    }
}

impl From<SiteRole> for Group {
    fn from(role: SiteRole) -> Self {
        match role {
            SiteRole::Business => Group::Business,
            SiteRole::Competitor => Group::Competitors,
        }
    }
}

/// One input site. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    root: Url,
    role: SiteRole,
}

impl Site {
    /// Parse user input into a site, canonicalizing the root URL.
    ///
    /// Input without a scheme is treated as `https://`. Anything that is not
    /// an http(s) URL with a host is rejected as `InvalidInput`.
    pub fn parse(input: &str, role: SiteRole) -> PulseResult<Self> {
        let root = parse_seed(input)?;
        Ok(Self { root, role })
    }

    /// Canonical root URL, the site's identifier.
    pub fn identifier(&self) -> &str {
        self.root.as_str()
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn role(&self) -> SiteRole {
        self.role
    }

    /// Lowercased host, e.g. `www.getorchestrated.com`.
    pub fn domain(&self) -> &str {
        // parse_seed guarantees a host
        self.root.host_str().unwrap_or_default()
    }

    /// Filesystem-safe prefix derived from the host (and port, if any).
    pub fn file_prefix(&self) -> String {
        file_prefix(&self.root)
    }

    /// Whether crawling both sites would produce one corpus: they share a
    /// cache file, or they are one host with and without `www.`.
    pub fn same_cache_entry(&self, other: &Site) -> bool {
        self.file_prefix() == other.file_prefix()
            || (same_site(self.domain(), other.domain())
                && self.root.port_or_known_default() == other.root.port_or_known_default())
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

fn invalid(input: &str, reason: impl Into<String>) -> PulseError {
    PulseError::InvalidInput {
        url: input.to_string(),
        reason: reason.into(),
    }
}

/// Parse and canonicalize a seed URL.
pub fn parse_seed(input: &str) -> PulseResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty URL"));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&with_scheme).map_err(|e| invalid(input, e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(input, format!("unsupported scheme {}", url.scheme())));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(invalid(input, "URL has no host")),
    }

    Ok(canonicalize(&url))
}

/// Canonical form used as the crawl dedup key.
///
/// Scheme and host are already lowercased by the `url` crate. The fragment
/// and tracking parameters are dropped, remaining query pairs keep their
/// order, and non-root paths lose a trailing slash.
pub fn canonicalize(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_fragment(None);

    if canonical.query().is_some() {
        let kept: Vec<(String, String)> = canonical
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            canonical.set_query(None);
        } else {
            canonical.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    let path = canonical.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        canonical.set_path(path.trim_end_matches('/'));
    }

    canonical
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Whether two hosts belong to the same site, ignoring a leading `www.`.
pub fn same_site(a: &str, b: &str) -> bool {
    strip_www(a).eq_ignore_ascii_case(strip_www(b))
}

pub(crate) fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// File-name prefix for a URL: every run of characters outside `[a-z0-9]`
/// in the lowercased host becomes a single separator.
pub fn file_prefix(url: &Url) -> String {
    let mut netloc = url.host_str().unwrap_or_default().to_lowercase();
    if let Some(port) = url.port() {
        netloc.push(':');
        netloc.push_str(&port.to_string());
    }
    sanitize(&netloc)
}

pub(crate) fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with(FILE_SEPARATOR) {
            out.push(FILE_SEPARATOR);
        }
    }
    out
}
