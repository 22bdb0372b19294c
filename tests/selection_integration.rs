//! Integration tests for violation selection.

use rulecore::stat::{DataPoints, NodeRef, ThresholdPolicy, ViolationSelector};

fn points(scores: &[f64]) -> DataPoints {
    let mut points = DataPoints::new();
    for (i, score) in scores.iter().enumerate() {
        points.record(NodeRef(100 + i), *score);
    }
    points
}

#[test]
fn test_minimum_keeps_traversal_order() {
    let points = points(&[50.0, 80.0, 120.0, 200.0]);
    let selector = ViolationSelector::new(ThresholdPolicy::Minimum(100.0));
    let nodes: Vec<NodeRef> = selector
        .select(points.as_slice())
        .iter()
        .map(|p| p.node)
        .collect();
    assert_eq!(nodes, vec![NodeRef(102), NodeRef(103)]);
}

#[test]
fn test_single_violation_parameters() {
    let points = points(&[150.0, 99.0]);
    let selector = ViolationSelector::new(ThresholdPolicy::Minimum(100.0));
    let violations = selector.violations(points.as_slice(), |p| {
        vec![format!("ctor{}", p.node.0), rulecore::stat::format_score(p.score)]
    });
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].node, NodeRef(100));
    assert_eq!(violations[0].parameters, vec!["ctor100", "150"]);
}

#[test]
fn test_sigma_with_too_few_points() {
    let selector = ViolationSelector::new(ThresholdPolicy::Sigma(0.1));
    for scores in [&[][..], &[5000.0][..]] {
        let points = points(scores);
        assert!(selector.select(points.as_slice()).is_empty());
    }
}

#[test]
fn test_sigma_and_top_combined() {
    // mean 30, sample deviation ~38.7; threshold at sigma 0.5 is ~49.3
    let scores = [10.0, 12.0, 95.0, 11.0, 90.0, 9.0, 8.0, 5.0];
    let selector = ViolationSelector::new(ThresholdPolicy::Sigma(0.5));
    let points = points(&scores);
    let flagged: Vec<f64> = selector
        .select(points.as_slice())
        .iter()
        .map(|p| p.score)
        .collect();
    assert_eq!(flagged, vec![95.0, 90.0]);

    let top = selector.top(1);
    let flagged: Vec<f64> = top
        .select(points.as_slice())
        .iter()
        .map(|p| p.score)
        .collect();
    assert_eq!(flagged, vec![95.0]);
}

#[test]
fn test_selection_is_repeatable() {
    let points = points(&[3.0, 300.0, 30.0]);
    let selector = ViolationSelector::new(ThresholdPolicy::Minimum(30.0));
    let first = selector.violations(points.as_slice(), |p| vec![p.score.to_string()]);
    let second = selector.violations(points.as_slice(), |p| vec![p.score.to_string()]);
    assert_eq!(first, second);
}
