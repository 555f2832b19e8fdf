// Breadth-first crawl frontier for a single site.
//
// Every URL is admitted at most once: the `seen` set covers both fetched and
// still-queued URLs, so back-links and cycles are dropped at offer time.
// Depth is fixed when a URL is first admitted and never revisited. Within a
// depth level, about-like pages are handed out before the rest, each group in
// discovery order. A leading `www.` is ignored when deciding whether a URL was
// seen, so both spellings of one page are fetched once.

use std::collections::{BTreeMap, HashSet};

use url::Url;

use crate::site::strip_www;

/// A URL waiting to be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u8,
    pub about_like: bool,
}

#[derive(Debug, Default)]
struct Level {
    about: Vec<FrontierEntry>,
    other: Vec<FrontierEntry>,
}

#[derive(Debug)]
pub struct Frontier {
    max_depth: u8,
    seen: HashSet<String>,
    levels: BTreeMap<u8, Level>,
}

impl Frontier {
    /// Start a frontier holding only the seed at depth 0.
    pub fn new(seed: Url, max_depth: u8) -> Self {
        let mut frontier = Self {
            max_depth,
            seen: HashSet::new(),
            levels: BTreeMap::new(),
        };
        frontier.offer(seed, 0, false);
        frontier
    }

    /// Admit a canonical URL at `depth`. Returns false when it was already
    /// seen or lies beyond the depth bound.
    pub fn offer(&mut self, url: Url, depth: u8, about_like: bool) -> bool {
        if depth > self.max_depth {
            return false;
        }
        if !self.seen.insert(seen_key(&url)) {
            return false;
        }

        let level = self.levels.entry(depth).or_default();
        let entry = FrontierEntry {
            url,
            depth,
            about_like,
        };
        if about_like {
            level.about.push(entry);
        } else {
            level.other.push(entry);
        }
        true
    }

    /// Record a URL as seen without queueing it (e.g. a redirect target).
    pub fn mark_seen(&mut self, url: &Url) {
        self.seen.insert(seen_key(url));
    }

    /// Remove and return the shallowest pending level, about-like pages first.
    pub fn next_level(&mut self) -> Vec<FrontierEntry> {
        let Some((_, level)) = self.levels.pop_first() else {
            return Vec::new();
        };
        let mut entries = level.about;
        entries.extend(level.other);
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of distinct URLs ever admitted or marked.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

fn seen_key(url: &Url) -> String {
    match url.host_str() {
        Some(host) if host != strip_www(host) => {
            let mut key = url.clone();
            match key.set_host(Some(strip_www(host))) {
                Ok(()) => key.into(),
                Err(_) => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
