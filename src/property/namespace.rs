//! Namespace allow-lists for values that originate from the type system.

use crate::error::ValidationError;

/// Ordered set of qualified-name prefixes. Empty means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceConstraint {
    prefixes: Vec<String>,
}

impl NamespaceConstraint {
    /// Build a constraint from prefixes such as `["java.lang", "com.acme"]`.
    /// Duplicates are dropped, first occurrence wins.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for prefix in prefixes {
            let prefix = prefix.into();
            if !prefix.is_empty() && !unique.contains(&prefix) {
                unique.push(prefix);
            }
        }
        Self { prefixes: unique }
    }

    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether a type with this qualified name is allowed.
    pub fn allows(&self, qualified_name: &str) -> bool {
        self.is_unconstrained()
            || self
                .prefixes
                .iter()
                .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    }

    /// Check that `owner` is allowed; `item` and `value` describe the rejected
    /// value in the message.
    pub fn check(&self, item: &'static str, value: &str, owner: &str) -> Result<(), ValidationError> {
        if self.allows(owner) {
            return Ok(());
        }
        Err(ValidationError::NamespaceViolation {
            item,
            value: value.to_string(),
            owner: owner.to_string(),
            allowed: self.prefixes.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_constraint_allows_everything() {
        let constraint = NamespaceConstraint::unconstrained();
        assert!(constraint.allows("anything.At.All"));
        assert!(constraint.check("type", "X", "x.X").is_ok());
    }

    #[test]
    fn test_prefix_matching() {
        let constraint = NamespaceConstraint::new(["java.lang", "com.acme", "java.lang"]);
        assert_eq!(constraint.prefixes().len(), 2);
        assert!(constraint.allows("java.lang.String"));
        assert!(constraint.allows("com.acme.Widget"));
        assert!(!constraint.allows("java.util.List"));

        let err = constraint
            .check("method", "java.util.List#size()", "java.util.List")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("java.util.List"));
        assert!(message.contains("java.lang, com.acme"));
    }
}
