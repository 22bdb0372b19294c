//! Threshold policies.

use std::collections::HashSet;

use super::{DataPoint, Violation};

/// How a rule decides that a score stands out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdPolicy {
    /// Flag every point with `score >= minimum`.
    Minimum(f64),
    /// Flag every point with `score > mean + sigma * standard deviation`.
    Sigma(f64),
}

/// Reduces the data points of one run to violations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViolationSelector {
    policy: ThresholdPolicy,
    top: Option<usize>,
}

impl ViolationSelector {
    pub fn new(policy: ThresholdPolicy) -> Self {
        Self { policy, top: None }
    }

    /// Keep at most `count` of the highest flagged scores.
    pub fn top(mut self, count: usize) -> Self {
        self.top = Some(count);
        self
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    pub fn top_limit(&self) -> Option<usize> {
        self.top
    }

    /// Flagged points, in traversal order.
    pub fn select<'a>(&self, points: &'a [DataPoint]) -> Vec<&'a DataPoint> {
        let usable = points.iter().filter(|p| p.is_usable());
        let flagged: Vec<&DataPoint> = match self.policy {
            ThresholdPolicy::Minimum(minimum) => usable.filter(|p| p.score >= minimum).collect(),
            ThresholdPolicy::Sigma(sigma) => {
                let scores: Vec<f64> = usable.clone().map(|p| p.score).collect();
                match mean_and_deviation(&scores) {
                    Some((mean, deviation)) => {
                        let threshold = mean + sigma * deviation;
                        usable.filter(|p| p.score > threshold).collect()
                    }
                    None => Vec::new(),
                }
            }
        };

        match self.top {
            Some(count) if flagged.len() > count => keep_highest(flagged, count),
            _ => flagged,
        }
    }

    /// Flag points and build one violation per flagged point.
    pub fn violations<F>(&self, points: &[DataPoint], mut parameters: F) -> Vec<Violation>
    where
        F: FnMut(&DataPoint) -> Vec<String>,
    {
        self.select(points)
            .into_iter()
            .map(|point| Violation {
                node: point.node,
                parameters: parameters(point),
            })
            .collect()
    }
}

/// Keep the `count` highest scores (earlier sequence wins ties), preserving
/// traversal order.
fn keep_highest(flagged: Vec<&DataPoint>, count: usize) -> Vec<&DataPoint> {
    let mut ranked = flagged.clone();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.sequence.cmp(&b.sequence))
    });
    let kept: HashSet<usize> = ranked.iter().take(count).map(|p| p.sequence).collect();
    flagged
        .into_iter()
        .filter(|p| kept.contains(&p.sequence))
        .collect()
}

/// Mean and sample standard deviation. `None` for fewer than two scores.
pub fn mean_and_deviation(scores: &[f64]) -> Option<(f64, f64)> {
    if scores.len() < 2 {
        return None;
    }
    let count = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / count;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (count - 1.0);
    Some((mean, variance.sqrt()))
}

/// Display form of a score: truncated toward zero.
pub fn format_score(score: f64) -> String {
    (score.trunc() as i64).to_string()
}
