// Brand vocabulary derived from a domain name and, optionally, a business name.
//
// A site talking about itself ("Acme ships fast, Acme cares") tells us nothing
// about how it differs from competitors, so these terms are filtered out.
// Matching is exact: a token must equal a full name component (or a
// component with a marketing prefix/suffix removed). Short common words that
// merely occur inside the domain are never excluded.

use std::collections::HashSet;

use crate::site::strip_www;

/// Prefixes startups glue onto a name to get a free domain.
const MARKETING_PREFIXES: &[&str] = &["get", "try", "use", "go", "my", "join", "hello", "meet", "the"];

/// Suffixes glued on for the same reason.
const MARKETING_SUFFIXES: &[&str] = &["app", "hq", "labs", "inc", "io", "ai"];

/// Second-level labels used under country-code TLDs (acme.co.uk).
const SECOND_LEVEL_LABELS: &[&str] = &["co", "com", "org", "net", "ac", "gov"];

/// Shortest remainder kept after stripping a prefix or suffix.
const MIN_REMAINDER: usize = 3;

/// Terms and phrases that identify a brand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandTerms {
    terms: HashSet<String>,
}

impl BrandTerms {
    /// Brand terms for a host such as `www.getorchestrated.com`.
    pub fn from_domain(domain: &str) -> Self {
        let mut terms = HashSet::new();
        let label = registrable_label(domain);

        let components: Vec<&str> = label
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|c| !c.is_empty())
            .collect();

        for component in &components {
            add_component(&mut terms, component);
        }

        if components.len() > 1 {
            terms.insert(components.concat());
            for pair in components.windows(2) {
                terms.insert(format!("{} {}", pair[0], pair[1]));
            }
        }

        Self { terms }
    }

    /// Brand terms for a human-readable business name such as
    /// "Orchestrated Logistics": each word, plus each adjacent pair both
    /// space-joined and concatenated. Words `is_stop_word` rejects are
    /// skipped before pairing.
    pub fn from_name(name: &str, is_stop_word: impl Fn(&str) -> bool) -> Self {
        let lowered = name.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty() && !is_stop_word(w))
            .collect();

        let mut terms: HashSet<String> = words.iter().map(|w| w.to_string()).collect();
        for pair in words.windows(2) {
            terms.insert(format!("{} {}", pair[0], pair[1]));
            terms.insert(pair.concat());
        }

        Self { terms }
    }

    /// Add every term of `other`.
    pub fn extend(&mut self, other: BrandTerms) {
        self.terms.extend(other.terms);
    }

    /// Exact membership test for a token or space-joined phrase.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in alphabetical order, for logging.
    pub fn sorted(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.terms.iter().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }
}

/// The label that names the business: `getorchestrated` for
/// `www.getorchestrated.com`, `acme` for `shop.acme.co.uk`.
fn registrable_label(domain: &str) -> String {
    let host = domain.trim().to_lowercase();
    let host = strip_www(&host);
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

    let index = match labels.len() {
        0 => return String::new(),
        1 => 0,
        n if n >= 3
            && labels[n - 1].len() == 2
            && SECOND_LEVEL_LABELS.contains(&labels[n - 2]) =>
        {
            n - 3
        }
        n => n - 2,
    };
    labels[index].to_string()
}

fn add_component(terms: &mut HashSet<String>, component: &str) {
    terms.insert(component.to_string());

    // Tokens are alphabetic runs, so "acme2go" also needs "acme" and "go"
    let alpha_runs: Vec<&str> = component
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|r| !r.is_empty())
        .collect();
    if alpha_runs.len() > 1 {
        terms.insert(alpha_runs.concat());
        for run in &alpha_runs {
            if run.len() >= MIN_REMAINDER {
                terms.insert(run.to_string());
            }
        }
    }

    for prefix in MARKETING_PREFIXES {
        if let Some(rest) = component.strip_prefix(prefix) {
            if rest.len() >= MIN_REMAINDER {
                terms.insert(rest.to_string());
            }
        }
    }
    for suffix in MARKETING_SUFFIXES {
        if let Some(rest) = component.strip_suffix(suffix) {
            if rest.len() >= MIN_REMAINDER {
                terms.insert(rest.to_string());
            }
        }
    }
}
