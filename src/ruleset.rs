//! Rule set definitions.
//!
//! A rule set names the rules to run and the raw text of their properties:
//!
//! ```yaml
//! name: "java-defaults"
//! excluded_paths:
//!   - "**/generated/**"
//! rules:
//!   - name: NcssConstructorCount
//!     severity: warning
//!     properties:
//!       minimum: 60
//!       ignoredCalls:
//!         - "java.util.Objects#requireNonNull(Object)"
//! ```
//!
//! Property values go through the same parse and validation path as any
//! other text. Each list entry is one item of a multi-valued property.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::detect::Severity;
use crate::rules::{self, ConfiguredRule};
use crate::types::TypeNameRegistry;

/// Top-level rule set definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RuleSet {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Glob patterns for paths to skip (e.g. "**/generated/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// One rule and its property text.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    pub name: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_yaml::Value>,
}

impl RuleConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity: None,
            properties: BTreeMap::new(),
        }
    }

    /// Set a property's raw text.
    pub fn property(mut self, name: &str, text: &str) -> Self {
        self.properties
            .insert(name.to_string(), serde_yaml::Value::String(text.to_string()));
        self
    }
}

impl RuleSet {
    /// Parse a rule set from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let ruleset: RuleSet = serde_yaml::from_str(content)?;
        Ok(ruleset)
    }

    /// Every built-in rule with its default properties.
    pub fn all_rules() -> Self {
        Self {
            name: "builtin".to_string(),
            rules: rules::available()
                .iter()
                .map(|entry| RuleConfig::new(entry.name))
                .collect(),
            ..Default::default()
        }
    }

    /// Compile `excluded_paths` into one matcher.
    pub fn exclusions(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| {
                anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e)
            })?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }
}

/// A rule that could not be configured, with every problem found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub rule: String,
    pub problems: Vec<String>,
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}: {}", self.rule, self.problems.join("; "))
    }
}

/// Outcome of loading a rule set. Failing rules are left out of `rules`.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub rules: Vec<ConfiguredRule>,
    pub failures: Vec<RuleFailure>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Instantiate and configure every rule of a rule set.
pub fn load(ruleset: &RuleSet, registry: Arc<TypeNameRegistry>) -> LoadReport {
    let mut report = LoadReport::default();
    for config in &ruleset.rules {
        match configure_rule(config, Arc::clone(&registry)) {
            Ok(rule) => {
                debug!(rule = %config.name, selector = ?rule.selector(), "configured rule");
                report.rules.push(rule);
            }
            Err(problems) => {
                warn!(rule = %config.name, count = problems.len(), "rule rejected");
                report.failures.push(RuleFailure {
                    rule: config.name.clone(),
                    problems,
                });
            }
        }
    }
    report
}

fn configure_rule(
    config: &RuleConfig,
    registry: Arc<TypeNameRegistry>,
) -> Result<ConfiguredRule, Vec<String>> {
    let mut rule = rules::create(&config.name, registry).map_err(|e| vec![e.to_string()])?;

    let mut problems = Vec::new();
    for (name, value) in &config.properties {
        let configured = match value {
            serde_yaml::Value::Sequence(entries) => entries
                .iter()
                .map(scalar_text)
                .collect::<Option<Vec<String>>>()
                .map(|items| rule.properties_mut().configure_items(name, &items)),
            scalar => scalar_text(scalar).map(|text| rule.properties_mut().configure(name, &text)),
        };
        match configured {
            Some(Ok(())) => {}
            Some(Err(e)) => problems.push(e.to_string()),
            None => problems.push(format!(
                "property {:?}: expected a scalar or a list of scalars",
                name
            )),
        }
    }
    if !problems.is_empty() {
        return Err(problems);
    }

    ConfiguredRule::new(rule, config.severity.unwrap_or_default()).map_err(|e| vec![e.to_string()])
}

/// Raw text of a scalar YAML value.
fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use super::*;
    use crate::rules::ncss;
    use crate::stat::ThresholdPolicy;
    use crate::types;

    #[test]
    fn test_parse_ruleset() {
        let yaml = r#"
version: "1.0"
name: "strict"
excluded_paths:
  - "**/generated/**"
rules:
  - name: NcssConstructorCount
    severity: error
    properties:
      minimum: 40
"#;
        let ruleset = RuleSet::from_str(yaml).unwrap();
        assert_eq!(ruleset.name, "strict");
        assert_eq!(ruleset.rules[0].severity, Some(Severity::Error));

        let report = load(&ruleset, types::builtin().unwrap());
        assert!(report.is_clean());
        assert_eq!(
            report.rules[0].selector().policy(),
            ThresholdPolicy::Minimum(40.0)
        );
        assert_eq!(report.rules[0].severity(), Severity::Error);

        let exclusions = ruleset.exclusions().unwrap();
        assert!(exclusions.is_match("src/generated/Big.java"));
        assert!(!exclusions.is_match("src/main/Big.java"));
    }

    #[test]
    fn test_list_values_are_items() {
        let yaml = r#"
rules:
  - name: NcssConstructorCount
    properties:
      ignoredCalls:
        - "java.util.Objects#requireNonNull(Object)"
        - "Math#max(int,int)"
"#;
        let report = load(&RuleSet::from_str(yaml).unwrap(), types::builtin().unwrap());
        assert!(report.is_clean(), "{:?}", report.failures);
        let rule = &report.rules[0];
        assert_eq!(rule.rule().properties().methods(ncss::IGNORED_CALLS).len(), 2);
    }

    #[test]
    fn test_list_items_may_contain_spaces() {
        let yaml = r#"
rules:
  - name: NcssConstructorCount
    properties:
      ignoredCalls:
        - "Math#max(int, int)"
        - "String#substring(int, int)"
"#;
        let report = load(&RuleSet::from_str(yaml).unwrap(), types::builtin().unwrap());
        assert!(report.is_clean(), "{:?}", report.failures);
        let calls = report.rules[0].rule().properties().methods(ncss::IGNORED_CALLS);
        let names: Vec<&str> = calls.iter().map(|m| m.method_name.as_str()).collect();
        assert_eq!(names, vec!["max", "substring"]);
        assert!(calls.iter().all(|m| m.parameter_types.len() == 2));
    }

    #[test]
    fn test_nested_list_is_rejected() {
        let yaml = r#"
rules:
  - name: NcssConstructorCount
    properties:
      ignoredCalls:
        - ["Math#max(int,int)"]
"#;
        let report = load(&RuleSet::from_str(yaml).unwrap(), types::builtin().unwrap());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].problems[0].contains("list of scalars"));
    }

    #[test]
    fn test_failures_are_collected() {
        let ruleset = RuleSet {
            rules: vec![
                RuleConfig::new("NoSuchRule"),
                RuleConfig::new(ncss::NAME)
                    .property("minimum", "-1")
                    .property("colour", "red"),
                RuleConfig::new(ncss::NAME)
                    .property("minimum", "10")
                    .property("sigma", "2"),
                RuleConfig::new(ncss::NAME),
            ],
            ..Default::default()
        };
        let report = load(&ruleset, types::builtin().unwrap());
        assert_eq!(report.rules.len(), 1);
        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.failures[0].rule, "NoSuchRule");
        assert_eq!(report.failures[1].problems.len(), 2);
        assert!(report.failures[2].problems[0].contains("both"));
    }

    #[test]
    fn test_all_rules() {
        let report = load(&RuleSet::all_rules(), types::builtin().unwrap());
        assert!(report.is_clean());
        assert_eq!(report.rules.len(), rules::available().len());
    }

    #[test]
    fn test_invalid_exclusion() {
        let ruleset = RuleSet {
            excluded_paths: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(ruleset.exclusions().is_err());
    }
}
