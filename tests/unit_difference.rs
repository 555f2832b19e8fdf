// Unit tests for the directional difference rule.
//
// Tests the 4x dominance threshold, the 0.01 floor, the 100-term cap and
// the guarantee that no term lands in both directions.

use sitepulse::site::Group;
use sitepulse::topics::difference::{differ, DifferenceRule};
use sitepulse::topics::vocabulary::{WeightedVocabulary, MAX_TERMS};

fn business(pairs: &[(&str, f64)]) -> WeightedVocabulary {
    WeightedVocabulary::from_pairs(Group::Business, pairs)
}

fn competitors(pairs: &[(&str, f64)]) -> WeightedVocabulary {
    WeightedVocabulary::from_pairs(Group::Competitors, pairs)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================
// Threshold rule
// ============================================================

#[test]
fn exactly_four_times_is_dominant() {
    let (a_over_b, b_over_a) = differ(
        &business(&[("term", 0.8)]),
        &competitors(&[("term", 0.2)]),
    );
    assert!(approx(a_over_b.terms.weight("term"), 0.6));
    assert!(b_over_a.terms.is_empty());
}

#[test]
fn three_times_is_in_neither_set() {
    let (a_over_b, b_over_a) = differ(
        &business(&[("term", 0.3)]),
        &competitors(&[("term", 0.1)]),
    );
    assert!(!a_over_b.terms.contains("term"));
    assert!(!b_over_a.terms.contains("term"));
}

#[test]
fn speed_dominates_and_equal_support_is_dropped() {
    let (a_over_b, b_over_a) = differ(
        &business(&[("speed", 0.9), ("support", 0.05)]),
        &competitors(&[("speed", 0.2), ("support", 0.05)]),
    );
    assert_eq!(a_over_b.terms.len(), 1);
    assert!(approx(a_over_b.terms.weight("speed"), 0.7));
    assert!(!b_over_a.terms.contains("support"));
}

#[test]
fn term_absent_from_business_keeps_full_weight() {
    let (_, b_over_a) = differ(
        &business(&[("speed", 0.9)]),
        &competitors(&[("warranty", 0.3)]),
    );
    assert!(approx(b_over_a.terms.weight("warranty"), 0.3));
    assert_eq!(b_over_a.dominant, Group::Competitors);
}

#[test]
fn floor_is_exclusive() {
    let (a_over_b, _) = differ(
        &business(&[("faint", 0.01), ("visible", 0.011)]),
        &competitors(&[]),
    );
    assert!(!a_over_b.terms.contains("faint"));
    assert!(a_over_b.terms.contains("visible"));
}

// ============================================================
// Set properties
// ============================================================

#[test]
fn no_term_in_both_directions() {
    let a = business(&[
        ("alpha", 0.9),
        ("beta", 0.4),
        ("gamma", 0.05),
        ("delta", 0.3),
    ]);
    let b = competitors(&[
        ("alpha", 0.1),
        ("beta", 0.4),
        ("gamma", 0.6),
        ("epsilon", 0.2),
    ]);
    let (a_over_b, b_over_a) = differ(&a, &b);

    for term in a_over_b.terms.terms() {
        assert!(!b_over_a.terms.contains(term), "{term} in both sets");
    }
    assert!(a_over_b.terms.contains("alpha"));
    assert!(a_over_b.terms.contains("delta"));
    assert!(b_over_a.terms.contains("gamma"));
    assert!(b_over_a.terms.contains("epsilon"));
    assert!(!a_over_b.terms.contains("beta") && !b_over_a.terms.contains("beta"));
}

#[test]
fn every_difference_weight_is_positive_and_capped() {
    let pairs: Vec<(String, f64)> = (0..150)
        .map(|i| (format!("term{i:03}"), 0.02 + i as f64 * 0.001))
        .collect();
    let refs: Vec<(&str, f64)> = pairs.iter().map(|(t, w)| (t.as_str(), *w)).collect();

    // from_pairs already caps the input vocabulary
    let a = business(&refs);
    assert_eq!(a.terms.len(), MAX_TERMS);

    let rule = DifferenceRule {
        cap: 10,
        ..DifferenceRule::default()
    };
    let (a_over_b, _) = rule.differ(&a, &competitors(&[]));
    assert_eq!(a_over_b.terms.len(), 10);
    assert!(a_over_b.terms.iter().all(|(_, w)| w > 0.0));
    assert_eq!(a_over_b.terms.terms().next(), Some("term149"));
}

#[test]
fn difference_sets_serialize_as_term_weight_maps() {
    let (a_over_b, _) = differ(&business(&[("kayak", 0.5)]), &competitors(&[]));
    let json = serde_json::to_value(&a_over_b.terms).unwrap();
    assert_eq!(json, serde_json::json!({ "kayak": 0.5 }));
}
