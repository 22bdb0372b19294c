//! rulecore - typed rule properties and statistical violation selection.
//!
//! Rules are configured from text. Every property parses its value,
//! serializes it back, and validates it before a rule runs; method and type
//! references resolve through an explicit registry of known types. Rules then
//! measure nodes of a syntax tree and a selector reports the scores that
//! exceed a fixed minimum or stand out statistically.
//!
//! # Architecture
//!
//! - `types`: type registry, aliases and the embedded Java catalog
//! - `property`: property descriptors, including method references
//! - `stat`: data points and violation selection
//! - `rules`: the statistical rule trait and the built-in rules
//! - `ruleset`: YAML rule set loading
//! - `detect`: runs configured rules over files
//! - `report`: output formatting (text, JSON)
//!
//! # Adding a New Rule
//!
//! See `src/rules/ncss.rs`. Implement `StatisticalRule` and register it in
//! `rules::RULES`.

pub mod cli;
pub mod detect;
pub mod error;
pub mod property;
pub mod report;
pub mod rules;
pub mod ruleset;
pub mod stat;
pub mod types;

pub use detect::{ReportedViolation, RunResult, Runner, Severity};
pub use error::{
    ConfigurationError, ConfigureError, ParseError, PropertyError, ResolutionError,
    ValidationError,
};
pub use property::{
    MethodProperty, MethodSignature, NamespaceConstraint, PropertyDescriptor, PropertyMeta,
    PropertySet, PropertyValue,
};
pub use rules::{ConfiguredRule, Measurements, StatisticalRule};
pub use ruleset::{LoadReport, RuleSet};
pub use stat::{DataPoint, DataPoints, NodeRef, ThresholdPolicy, Violation, ViolationSelector};
pub use types::{TypeNameRegistry, TypeRef};
