// Unit tests for normalization feeding the TF-IDF vectorizer.
//
// Tests brand filtering end to end, the effect of the two-document IDF on
// shared versus distinctive terms, and empty-site handling.

use sitepulse::error::PulseError;
use sitepulse::site::Group;
use sitepulse::text::brand::BrandTerms;
use sitepulse::text::normalize::Normalizer;
use sitepulse::topics::tfidf::{GroupedCorpus, SiteTerms, TfIdfVectorizer};
use sitepulse::topics::traits::VocabularyWeighter;

fn site_terms(normalizer: &Normalizer, name: &str, text: &str, brand: &BrandTerms) -> SiteTerms {
    SiteTerms {
        site: name.to_string(),
        terms: normalizer.analyze(text, brand),
    }
}

// ============================================================
// Brand filtering
// ============================================================

#[test]
fn business_brand_never_reaches_the_vocabulary() {
    let normalizer = Normalizer::default();
    let brand = BrandTerms::from_domain("getorchestrated.com");

    let business = site_terms(
        &normalizer,
        "https://getorchestrated.com/",
        "Orchestrated logistics. GetOrchestrated orchestrated orchestrated freight dispatch. \
         Orchestrated freight visibility.",
        &brand,
    );
    let mut rival_brand = brand.clone();
    rival_brand.extend(BrandTerms::from_domain("rival.test"));
    let rival = site_terms(
        &normalizer,
        "https://rival.test/",
        "Freight brokerage and carrier payments",
        &rival_brand,
    );

    let corpus = GroupedCorpus::new(vec![business], vec![rival]).unwrap();
    let (a, b) = TfIdfVectorizer::default().vectorize_both(&corpus).unwrap();

    for vocab in [&a, &b] {
        assert!(!vocab.terms.contains("orchestrated"));
        assert!(!vocab.terms.contains("getorchestrated"));
    }
    assert!(a.terms.contains("freight"));
    assert!(a.terms.contains("dispatch"));
}

#[test]
fn short_common_words_inside_the_brand_survive() {
    let normalizer = Normalizer::default();
    let brand = BrandTerms::from_domain("orchestrated.com");
    let terms = normalizer.analyze("orchestra chest", &brand);
    assert!(terms.contains(&"orchestra".to_string()));
    assert!(terms.contains(&"chest".to_string()));
}

// ============================================================
// Weighting
// ============================================================

#[test]
fn distinctive_terms_outrank_shared_terms() {
    let a = SiteTerms {
        site: "a".into(),
        terms: vec!["kayak".into(), "canoe".into()],
    };
    let b = SiteTerms {
        site: "b".into(),
        terms: vec!["canoe".into(), "raft".into()],
    };
    let corpus = GroupedCorpus::new(vec![a], vec![b]).unwrap();
    let vocab = TfIdfVectorizer::default()
        .vectorize(&corpus, Group::Business)
        .unwrap();

    assert!(vocab.weight("kayak") > vocab.weight("canoe"));
    assert_eq!(vocab.weight("raft"), 0.0);

    let norm: f64 = vocab.terms.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    assert!((norm - 1.0).abs() < 1e-9);
}

#[test]
fn competitors_are_merged_into_one_document() {
    let business = SiteTerms {
        site: "a".into(),
        terms: vec!["kayak".into()],
    };
    let rival_one = SiteTerms {
        site: "b".into(),
        terms: vec!["raft".into(), "rapids".into()],
    };
    let rival_two = SiteTerms {
        site: "c".into(),
        terms: vec!["raft".into()],
    };
    let corpus = GroupedCorpus::new(vec![business], vec![rival_one, rival_two]).unwrap();
    let vocab = TfIdfVectorizer::default()
        .vectorize(&corpus, Group::Competitors)
        .unwrap();

    // raft appears twice across competitors, rapids once
    assert!((vocab.weight("raft") / vocab.weight("rapids") - 2.0).abs() < 1e-9);
}

#[test]
fn equal_weights_rank_alphabetically() {
    let business = SiteTerms {
        site: "a".into(),
        terms: vec!["zebra".into(), "apple".into(), "mango".into()],
    };
    let rival = SiteTerms {
        site: "b".into(),
        terms: vec!["other".into()],
    };
    let corpus = GroupedCorpus::new(vec![business], vec![rival]).unwrap();
    let vocab = TfIdfVectorizer::default()
        .vectorize(&corpus, Group::Business)
        .unwrap();
    let order: Vec<&str> = vocab.terms.terms().collect();
    assert_eq!(order, vec!["apple", "mango", "zebra"]);
}

#[test]
fn top_n_limits_the_vocabulary() {
    let business = SiteTerms {
        site: "a".into(),
        terms: (0..300).map(|i| format!("term{i}")).collect(),
    };
    let rival = SiteTerms {
        site: "b".into(),
        terms: vec!["other".into()],
    };
    let corpus = GroupedCorpus::new(vec![business], vec![rival]).unwrap();
    let (a, _) = TfIdfVectorizer::default().vectorize_both(&corpus).unwrap();
    assert_eq!(a.terms.len(), 100);
}

// ============================================================
// Empty sites
// ============================================================

#[test]
fn empty_competitor_is_excluded_but_others_remain() {
    let business = SiteTerms {
        site: "a".into(),
        terms: vec!["kayak".into()],
    };
    let empty = SiteTerms {
        site: "b".into(),
        terms: vec![],
    };
    let rival = SiteTerms {
        site: "c".into(),
        terms: vec!["raft".into()],
    };
    let corpus = GroupedCorpus::new(vec![business], vec![empty, rival]).unwrap();
    assert_eq!(corpus.excluded(), ["b".to_string()]);
    assert_eq!(corpus.sites(Group::Competitors).len(), 1);
}

#[test]
fn group_with_no_usable_site_is_an_error() {
    let business = SiteTerms {
        site: "a".into(),
        terms: vec!["kayak".into()],
    };
    let empty = SiteTerms {
        site: "b".into(),
        terms: vec![],
    };
    let err = GroupedCorpus::new(vec![business], vec![empty]).unwrap_err();
    assert!(matches!(
        err,
        PulseError::NoUsableCorpus {
            group: Group::Competitors
        }
    ));
    assert!(err.is_fatal());
}
