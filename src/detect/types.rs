//! Core types for check results.

use serde::{Deserialize, Serialize};

/// Severity levels for violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A violation located in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedViolation {
    pub rule: String,
    pub file: String,
    pub line: usize,
    pub message: String,
    pub parameters: Vec<String>,
    pub severity: Severity,
}

/// Results of running the configured rules over a set of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub violations: Vec<ReportedViolation>,
    /// Number of files scanned
    pub scanned: usize,
    /// Files that could not be read or parsed
    #[serde(default)]
    pub skipped: Vec<String>,
}

impl RunResult {
    /// Order violations by file, line, then rule.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.line.cmp(&b.line))
                .then_with(|| a.rule.cmp(&b.rule))
        });
        self.skipped.sort();
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations per rule, sorted by rule name.
    pub fn counts_by_rule(&self) -> Vec<(String, usize)> {
        let mut counts = std::collections::BTreeMap::new();
        for v in &self.violations {
            *counts.entry(v.rule.clone()).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }
}
