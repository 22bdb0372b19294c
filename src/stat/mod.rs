//! Per-run measurements and their reduction to violations.
//!
//! A rule records one `DataPoint` per node of interest while the tree is
//! walked. Once the walk is over, a `ViolationSelector` decides which points
//! stand out against the configured threshold.
//!
//! `DataPoints` is per-run state. Create a fresh collection for every input
//! being analysed; it is not meant to be shared between threads.

use serde::{Deserialize, Serialize};

mod selector;

pub use selector::{format_score, mean_and_deviation, ThresholdPolicy, ViolationSelector};

/// Opaque, non-owning handle to a node of an externally owned tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef(pub usize);

/// One measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub node: NodeRef,
    pub score: f64,
    /// Position in traversal order.
    pub sequence: usize,
}

impl DataPoint {
    /// Scores are finite and non-negative by construction; anything else is
    /// never flagged.
    pub fn is_usable(&self) -> bool {
        self.score.is_finite() && self.score >= 0.0
    }
}

/// Ordered collection of the data points of one run.
#[derive(Debug, Clone, Default)]
pub struct DataPoints {
    points: Vec<DataPoint>,
}

impl DataPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement in traversal order.
    pub fn record(&mut self, node: NodeRef, score: f64) {
        let sequence = self.points.len();
        self.points.push(DataPoint {
            node,
            score,
            sequence,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint> {
        self.points.iter()
    }
}

/// A flagged node with its message parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub node: NodeRef,
    pub parameters: Vec<String>,
}
