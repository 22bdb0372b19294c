//! Statistical rules.
//!
//! A statistical rule measures every node of interest in one input and lets a
//! `ViolationSelector` decide which measurements stand out. The threshold
//! comes from the rule's standard properties:
//!
//! - `minimum`: flag scores at or above this value
//! - `sigma`: flag scores above mean + sigma * standard deviation
//! - `topscore`: report at most this many of the highest scores
//!
//! An explicitly configured `sigma` selects the statistical policy; otherwise
//! the (possibly default) `minimum` applies.
//!
//! # Adding a Rule
//!
//! Implement `StatisticalRule`, define the threshold properties with
//! `define_threshold_properties`, and add an entry to `RULES`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::detect::Severity;
use crate::error::ConfigurationError;
use crate::property::{NumericProperty, PropertyMeta, PropertySet, PropertyValue};
use crate::stat::{
    format_score, DataPoint, DataPoints, NodeRef, ThresholdPolicy, Violation, ViolationSelector,
};
use crate::types::TypeNameRegistry;

#[cfg(feature = "tree-sitter")]
pub mod ncss;

pub const MINIMUM: &str = "minimum";
pub const SIGMA: &str = "sigma";
pub const TOP_SCORE: &str = "topscore";

/// Define `minimum`, `sigma` and `topscore` on a rule's property set.
pub fn define_threshold_properties(
    properties: &mut PropertySet,
    default_minimum: Option<f64>,
) -> Result<(), ConfigurationError> {
    let minimum_default = default_minimum.map_or(PropertyValue::Absent, PropertyValue::Single);
    properties.define(
        NumericProperty::new(
            PropertyMeta::new(MINIMUM, "Report scores at or above this value", 1.0),
            0.0,
            f64::MAX,
        )?
        .with_default(minimum_default),
    )?;
    properties.define(NumericProperty::new(
        PropertyMeta::new(
            SIGMA,
            "Report scores more than this many standard deviations above the mean",
            2.0,
        ),
        f64::MIN_POSITIVE,
        f64::MAX,
    )?)?;
    properties.define(NumericProperty::<i64>::new(
        PropertyMeta::new(TOP_SCORE, "Report at most this many of the highest scores", 3.0),
        1,
        i64::MAX,
    )?)?;
    Ok(())
}

/// Build the selector described by a rule's threshold properties.
pub fn selector_for(rule: &str, properties: &PropertySet) -> Result<ViolationSelector, ConfigurationError> {
    let policy = if properties.is_configured(SIGMA) {
        if properties.is_configured(MINIMUM) {
            return Err(ConfigurationError::ConflictingThresholds(rule.to_string()));
        }
        properties.float(SIGMA).map(ThresholdPolicy::Sigma)
    } else {
        properties.float(MINIMUM).map(ThresholdPolicy::Minimum)
    };
    let policy = policy.ok_or_else(|| ConfigurationError::MissingThreshold(rule.to_string()))?;

    let selector = ViolationSelector::new(policy);
    Ok(match properties.integer(TOP_SCORE) {
        Some(top) => selector.top(usize::try_from(top).unwrap_or(usize::MAX)),
        None => selector,
    })
}

/// Substitute `{0}`, `{1}`, ... in a message template. Placeholders are
/// replaced in one pass, so inserted parameters are never rescanned.
/// Unknown indices and stray braces are kept as written.
pub fn format_message(template: &str, parameters: &[String]) -> String {
    let mut message = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        message.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let parameter = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            parameters.get(index).map(|p| (p, close))
        });
        match parameter {
            Some((param, close)) => {
                message.push_str(param);
                rest = &after[close + 1..];
            }
            None => {
                message.push('{');
                rest = after;
            }
        }
    }
    message.push_str(rest);
    message
}

/// Human-readable identity of a measured node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLabel {
    pub name: String,
    /// Line number (1-indexed)
    pub line: usize,
}

/// Everything one traversal produced: the data points and the labels of
/// their nodes.
#[derive(Debug, Clone, Default)]
pub struct Measurements {
    pub points: DataPoints,
    labels: HashMap<NodeRef, NodeLabel>,
}

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node: NodeRef, score: f64, label: NodeLabel) {
        self.points.record(node, score);
        self.labels.insert(node, label);
    }

    pub fn label(&self, node: NodeRef) -> Option<&NodeLabel> {
        self.labels.get(&node)
    }

    /// Name of a node for messages; falls back to the raw handle.
    pub fn identify(&self, node: NodeRef) -> String {
        self.label(node)
            .map_or_else(|| format!("node#{}", node.0), |label| label.name.clone())
    }
}

/// A rule that turns per-node scores into violations.
///
/// Implementations are immutable once configured and shared between the
/// threads analysing different inputs; all per-input state lives in the
/// `Measurements` returned by `measure`.
pub trait StatisticalRule: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Message template with `{0}`, `{1}`, ... placeholders.
    fn message(&self) -> &str;

    fn properties(&self) -> &PropertySet;

    fn properties_mut(&mut self) -> &mut PropertySet;

    /// File extensions (without dot) this rule measures.
    fn file_extensions(&self) -> &'static [&'static str];

    /// Walk one input and record a data point per node of interest.
    fn measure(&self, source: &[u8]) -> anyhow::Result<Measurements>;

    /// Parameters of a violation: the node identifier and the score.
    fn violation_parameters(&self, point: &DataPoint, measurements: &Measurements) -> Vec<String> {
        vec![measurements.identify(point.node), format_score(point.score)]
    }

    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}

/// A rule whose configuration has been validated and whose threshold policy
/// has been resolved.
pub struct ConfiguredRule {
    rule: Box<dyn StatisticalRule>,
    selector: ViolationSelector,
    severity: Severity,
}

impl ConfiguredRule {
    pub fn new(rule: Box<dyn StatisticalRule>, severity: Severity) -> Result<Self, ConfigurationError> {
        let selector = selector_for(rule.name(), rule.properties())?;
        Ok(Self {
            rule,
            selector,
            severity,
        })
    }

    pub fn name(&self) -> &str {
        self.rule.name()
    }

    pub fn rule(&self) -> &dyn StatisticalRule {
        self.rule.as_ref()
    }

    pub fn selector(&self) -> &ViolationSelector {
        &self.selector
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Select the violations of one run.
    pub fn apply(&self, measurements: &Measurements) -> Vec<Violation> {
        self.selector
            .violations(measurements.points.as_slice(), |point| {
                self.rule.violation_parameters(point, measurements)
            })
    }

    pub fn message_for(&self, violation: &Violation) -> String {
        format_message(self.rule.message(), &violation.parameters)
    }
}

impl std::fmt::Debug for ConfiguredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredRule")
            .field("rule", &self.rule.name())
            .field("selector", &self.selector)
            .field("severity", &self.severity)
            .finish()
    }
}

/// Factory creating an unconfigured rule.
pub type RuleFactory = fn(Arc<TypeNameRegistry>) -> Result<Box<dyn StatisticalRule>, ConfigurationError>;

/// A rule available to rule sets.
pub struct RuleEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub factory: RuleFactory,
}

/// All built-in rules.
#[cfg(feature = "tree-sitter")]
static RULES: &[RuleEntry] = &[RuleEntry {
    name: ncss::NAME,
    description: ncss::DESCRIPTION,
    factory: ncss::factory,
}];

#[cfg(not(feature = "tree-sitter"))]
static RULES: &[RuleEntry] = &[];

pub fn available() -> &'static [RuleEntry] {
    RULES
}

/// Create a built-in rule by name.
pub fn create(
    name: &str,
    registry: Arc<TypeNameRegistry>,
) -> Result<Box<dyn StatisticalRule>, ConfigurationError> {
    let entry = RULES
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| ConfigurationError::UnknownRule(name.to_string()))?;
    (entry.factory)(registry)
}
