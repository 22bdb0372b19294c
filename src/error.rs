//! Error taxonomy for property parsing, resolution, validation and rule
//! configuration.
//!
//! Parse and resolution failures are returned from `value_from`; validation
//! failures surface as strings from `error_for`; configuration errors are
//! raised while descriptors, catalogs and rules are being assembled.

use thiserror::Error;

/// The text does not follow the expected grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid format {input:?}: {reason}")]
    InvalidFormat { input: String, reason: &'static str },

    #[error("missing method name in {input:?}")]
    MissingMethodName { input: String },

    #[error("unbalanced parentheses in {input:?}")]
    UnbalancedGroup { input: String },

    #[error("{input:?} is not a valid {expected}")]
    InvalidValue { input: String, expected: &'static str },
}

impl ParseError {
    pub(crate) fn invalid_format(input: &str, reason: &'static str) -> Self {
        ParseError::InvalidFormat {
            input: input.to_string(),
            reason,
        }
    }
}

/// The text was well formed but names something that cannot be located.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("unknown type {name:?}")]
    UnknownType { name: String },

    #[error("no method {method} on {type_name} or its ancestors")]
    MethodNotFound { type_name: String, method: String },
}

/// Failure produced by `PropertyDescriptor::value_from`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// A resolved value that fails a configured constraint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{item} {value}: type {owner} is not in a legal namespace (allowed: {allowed})")]
    NamespaceViolation {
        item: &'static str,
        value: String,
        owner: String,
        allowed: String,
    },

    #[error("value {value} is outside the range [{min}, {max}]")]
    OutOfRange { value: String, min: String, max: String },

    #[error("value {value:?} contains the delimiter {delimiter:?}")]
    ContainsDelimiter { value: String, delimiter: char },
}

/// Conflicting or incomplete settings detected while assembling descriptors,
/// type catalogs or rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("delimiter {delimiter:?} of property {property:?} is reserved by its value syntax")]
    DelimiterConflict { property: String, delimiter: char },

    #[error("property {0:?} is declared twice")]
    DuplicateProperty(String),

    #[error("unknown property {property:?} for rule {rule:?}")]
    UnknownProperty { rule: String, property: String },

    #[error("unknown rule {0:?}")]
    UnknownRule(String),

    #[error("rule {0:?} configures both 'minimum' and 'sigma'")]
    ConflictingThresholds(String),

    #[error("rule {0:?} has neither a 'minimum' nor a 'sigma' threshold")]
    MissingThreshold(String),

    #[error("type {0:?} is declared twice")]
    DuplicateType(String),

    #[error("alias {alias:?} already names {existing:?}")]
    AliasConflict { alias: String, existing: String },

    #[error("type {child:?} names undeclared parent {parent:?}")]
    UnknownParent { child: String, parent: String },

    #[error("type catalog: {0}")]
    CatalogSyntax(String),

    #[error("rule setup failed: {0}")]
    RuleSetup(String),
}

/// Failure to apply raw text to a named property of a property set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigureError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("property {property:?}: {source}")]
    Parse {
        property: String,
        source: PropertyError,
    },

    #[error("property {property:?}: {message}")]
    Invalid { property: String, message: String },
}
