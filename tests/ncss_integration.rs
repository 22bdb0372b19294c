//! End-to-end tests: rule sets from testdata, Java sources, the runner and
//! the JSON report.

#![cfg(feature = "tree-sitter")]

use std::path::PathBuf;

use rulecore::detect::{Runner, Severity};
use rulecore::report;
use rulecore::rules::ncss;
use rulecore::ruleset::{self, RuleSet};
use rulecore::types;
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn java_files() -> Vec<PathBuf> {
    let dir = testdata_path().join("java");
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .expect("should read testdata/java")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "java").unwrap_or(false))
        .collect();
    files.sort();
    files
}

fn load(name: &str) -> ruleset::LoadReport {
    let ruleset = RuleSet::parse_file(testdata_path().join("rulesets").join(name))
        .expect("should parse rule set");
    ruleset::load(&ruleset, types::builtin().unwrap())
}

/// A constructor with `statements` local declarations.
fn constructor(name: &str, statements: usize) -> String {
    let body: String = (0..statements)
        .map(|i| format!("        int v{} = {};\n", i, i))
        .collect();
    format!("    {}(int seed) {{\n{}    }}\n", name, body)
}

#[test]
fn test_default_minimum_flags_one_of_two() {
    let temp = TempDir::new().unwrap();
    let source = format!(
        "class Ledger {{\n{}}}\nclass Journal {{\n{}}}\n",
        constructor("Ledger", 149),
        constructor("Journal", 98)
    );
    let file = temp.path().join("Ledger.java");
    std::fs::write(&file, source).unwrap();

    let loaded = ruleset::load(&RuleSet::all_rules(), types::builtin().unwrap());
    assert!(loaded.is_clean());

    let result = Runner::new(temp.path()).run(&[file], &loaded.rules);
    assert_eq!(result.violations.len(), 1);
    let v = &result.violations[0];
    assert_eq!(v.rule, ncss::NAME);
    assert_eq!(v.parameters, vec!["Ledger(int)", "150"]);
    assert_eq!(v.line, 2);
    assert_eq!(v.severity, Severity::Warning);
}

#[test]
fn test_strict_ruleset_on_fixtures() {
    let loaded = load("strict.yaml");
    assert!(loaded.is_clean(), "{:?}", loaded.failures);

    let result = Runner::new(testdata_path().join("java")).run(&java_files(), &loaded.rules);
    assert_eq!(result.scanned, 2);
    assert_eq!(result.violations.len(), 1);

    let v = &result.violations[0];
    assert_eq!(v.file, "Widget.java");
    assert_eq!(v.line, 13);
    assert_eq!(v.parameters, vec!["Widget(String,int)", "12"]);
    assert_eq!(v.severity, Severity::Error);
    assert_eq!(
        v.message,
        "The constructor Widget(String,int) has an NCSS line count of 12"
    );
}

#[test]
fn test_ignored_calls_lower_the_score() {
    let loaded = load("ignore-calls.yaml");
    assert!(loaded.is_clean(), "{:?}", loaded.failures);

    let result = Runner::new(testdata_path().join("java")).run(&java_files(), &loaded.rules);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].parameters[1], "11");
}

#[test]
fn test_broken_ruleset_reports_every_failure() {
    let loaded = load("broken.yaml");
    assert_eq!(loaded.rules.len(), 1);
    assert_eq!(loaded.rules[0].severity(), Severity::Info);

    let failures: Vec<(&str, usize)> = loaded
        .failures
        .iter()
        .map(|f| (f.rule.as_str(), f.problems.len()))
        .collect();
    assert_eq!(
        failures,
        vec![
            (ncss::NAME, 1),
            (ncss::NAME, 2),
            ("CyclomaticComplexity", 1),
        ]
    );
    assert!(loaded.failures[0].problems[0].contains("both"));
    assert!(loaded.failures[1].problems.iter().any(|p| p.contains("topscore")));
    assert!(loaded.failures[1].problems.iter().any(|p| p.contains("bogus")));
}

#[test]
fn test_sigma_rule_flags_outlier() {
    let temp = TempDir::new().unwrap();
    let mut source = String::from("class Mixed {\n");
    for (i, size) in [2, 3, 2, 3, 2, 40].iter().enumerate() {
        source.push_str(&constructor(&format!("Mixed{}", i), *size));
    }
    source.push_str("}\n");
    let file = temp.path().join("Mixed.java");
    std::fs::write(&file, source).unwrap();

    let loaded = load("broken.yaml");
    let result = Runner::new(temp.path()).run(&[file], &loaded.rules);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].parameters, vec!["Mixed5(int)", "41"]);
}

#[test]
fn test_json_report_of_run() {
    let loaded = load("strict.yaml");
    let result = Runner::new(testdata_path().join("java")).run(&java_files(), &loaded.rules);

    let report = report::json_report("testdata/java", "strict.yaml", &result, &loaded.failures);
    assert!(!report.passed);
    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.violations[0].severity, "error");
    assert_eq!(report.breakdown[0].rule, ncss::NAME);
}
