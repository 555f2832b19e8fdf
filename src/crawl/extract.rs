// HTML text and link extraction.
//
// Text comes only from paragraphs, h1-h3 headings and div containers. Anything
// under script, style or navigation is dropped even when it sits inside one of
// those containers. Each text node is taken once, so nested divs do not
// duplicate their contents.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::site::canonicalize;

const CONTENT_TAGS: &[&str] = &["p", "h1", "h2", "h3", "div"];
const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "noscript", "template"];

/// Punctuation that survives cleaning. Everything else that is not
/// alphanumeric or whitespace becomes a space.
const BASIC_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', '-', '(', ')', '&', '/'];

/// Path or link text fragments that mark company-profile pages.
const ABOUT_PATTERNS: &[&str] = &[
    "about",
    "company",
    "who-we-are",
    "who we are",
    "our-story",
    "our story",
    "team",
];

/// Paths never worth fetching for vocabulary.
const SKIP_PATTERNS: &[&str] = &[
    "/wp-admin",
    "/wp-login",
    "/wp-content/uploads",
    "/login",
    "/logout",
    "/signin",
    "/signout",
    "/cart",
    "/checkout",
    "/cdn-cgi/",
    "/feed",
    "/rss",
    "/sitemap",
    ".pdf",
    ".jpg",
    ".jpeg",
    ".png",
    ".gif",
    ".svg",
    ".webp",
    ".css",
    ".js",
    ".xml",
    ".json",
    ".zip",
    ".mp4",
];

/// A link discovered on a page, already canonicalized.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredLink {
    pub url: Url,
    /// Path or anchor text looks like an about/company page.
    pub about_like: bool,
}

/// Everything the crawler needs from one HTML document.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub text: String,
    pub links: Vec<DiscoveredLink>,
}

/// Parse `html` once and pull out both the cleaned text and outbound links.
///
/// The parsed DOM is dropped before returning, so callers can hold the result
/// across await points.
pub fn parse_page(html: &str, base: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    ParsedPage {
        text: extract_text(&document),
        links: extract_links(&document, base),
    }
}

/// Cleaned visible text from content elements.
pub fn extract_text(document: &Html) -> String {
    let mut chunks: Vec<String> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let mut in_content = false;
        let mut excluded = false;
        for element in node.ancestors().filter_map(ElementRef::wrap) {
            let value = element.value();
            if EXCLUDED_TAGS.contains(&value.name()) || value.attr("role") == Some("navigation") {
                excluded = true;
                break;
            }
            if CONTENT_TAGS.contains(&value.name()) {
                in_content = true;
            }
        }
        if excluded || !in_content {
            continue;
        }

        let cleaned = clean_text(text);
        if !cleaned.is_empty() {
            chunks.push(cleaned);
        }
    }

    chunks.join(" ")
}

/// Collapse whitespace, replace unsupported characters, trim.
pub fn clean_text(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || BASIC_PUNCTUATION.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Outbound http(s) links, resolved against `base` and canonicalized.
/// Host filtering is left to the crawler.
pub fn extract_links(document: &Html, base: &Url) -> Vec<DiscoveredLink> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
            {
                return None;
            }

            let resolved = base.join(href).ok()?;
            if resolved.scheme() != "http" && resolved.scheme() != "https" {
                return None;
            }
            if is_skip_path(resolved.path()) {
                return None;
            }

            let anchor_text = anchor.text().collect::<String>();
            let url = canonicalize(&resolved);
            let about_like = is_about_like(url.path(), &anchor_text);
            Some(DiscoveredLink { url, about_like })
        })
        .collect()
}

/// Whether a path or its link text suggests an about/company page.
pub fn is_about_like(path: &str, link_text: &str) -> bool {
    let path = path.to_lowercase();
    let text = link_text.to_lowercase();
    ABOUT_PATTERNS
        .iter()
        .any(|pattern| path.contains(pattern) || text.contains(pattern))
}

fn is_skip_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    SKIP_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}
