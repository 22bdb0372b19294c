//! Output formatting for check results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::detect::{ReportedViolation, RunResult, Severity};
use crate::ruleset::RuleFailure;

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub ruleset: String,
    pub passed: bool,
    pub files_scanned: usize,
    pub violations: Vec<JsonViolation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_failures: Vec<JsonRuleFailure>,
    pub breakdown: Vec<BreakdownEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonViolation {
    pub rule: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    pub message: String,
    pub parameters: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRuleFailure {
    pub rule: String,
    pub problems: Vec<String>,
}

/// Violation count for one rule.
#[derive(Debug, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub rule: String,
    pub violations: usize,
}

/// Build the JSON report of a run.
pub fn json_report(
    path: &str,
    ruleset_path: &str,
    result: &RunResult,
    failures: &[RuleFailure],
) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        ruleset: ruleset_path.to_string(),
        passed: result.is_clean(),
        files_scanned: result.scanned,
        violations: result.violations.iter().map(violation_to_json).collect(),
        skipped: result.skipped.clone(),
        rule_failures: failures
            .iter()
            .map(|f| JsonRuleFailure {
                rule: f.rule.clone(),
                problems: f.problems.clone(),
            })
            .collect(),
        breakdown: result
            .counts_by_rule()
            .into_iter()
            .map(|(rule, violations)| BreakdownEntry { rule, violations })
            .collect(),
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    ruleset_path: &str,
    result: &RunResult,
    failures: &[RuleFailure],
) -> anyhow::Result<()> {
    let report = json_report(path, ruleset_path, result, failures);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn violation_to_json(v: &ReportedViolation) -> JsonViolation {
    JsonViolation {
        rule: v.rule.clone(),
        severity: v.severity.to_string(),
        file: v.file.clone(),
        line: v.line,
        message: v.message.clone(),
        parameters: v.parameters.clone(),
    }
}

/// Write results as colored terminal output.
pub fn write_pretty(path: &str, ruleset_path: &str, result: &RunResult, failures: &[RuleFailure]) {
    // Header
    println!();
    print!("  ");
    print!("{}", "rulecore".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Rule set: ".dimmed());
    println!("{}", ruleset_path);
    println!();

    if !failures.is_empty() {
        write_rule_failures(failures);
        println!();
    }

    if !result.violations.is_empty() {
        write_violations(&result.violations);
        println!();
    }

    if !result.skipped.is_empty() {
        println!("  {} ({}):", "Skipped".dimmed(), result.skipped.len());
        for file in &result.skipped {
            println!("    {}", file.dimmed());
        }
        println!();
    }

    let counts = result.counts_by_rule();
    if !counts.is_empty() {
        println!("  {}", "Breakdown:".bold());
        for (rule, count) in counts {
            let plural = if count != 1 { "s" } else { "" };
            println!("    {:<28} {} violation{}", rule, count, plural);
        }
        println!();
    }

    write_final_status(result);
    println!();
}

fn write_rule_failures(failures: &[RuleFailure]) {
    println!("  {} ({}):", "Rejected rules".red().bold(), failures.len());
    for failure in failures {
        println!("    {}", failure.rule.bold());
        for problem in &failure.problems {
            println!("      {}", problem);
        }
    }
}

fn write_violations(violations: &[ReportedViolation]) {
    println!("  {} ({}):", "Violations".bold(), violations.len());
    println!();

    for v in violations {
        write_severity_tag(&v.severity);
        print!("   ");
        print!("{:<24}", v.rule.dimmed());
        print!("{}", v.file.blue());
        if v.line > 0 {
            print!("{}", format!(":{}", v.line).dimmed());
        }
        println!();

        // Message on next line, indented
        println!("            {}", v.message);
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_final_status(result: &RunResult) {
    print!("  {}", format!("Files: {}", result.scanned).dimmed());
    print!("  ");
    if result.is_clean() {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
}
