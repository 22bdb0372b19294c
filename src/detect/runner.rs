//! Runner that applies configured rules to files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use globset::GlobSet;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::rules::ConfiguredRule;

use super::{ReportedViolation, RunResult};

/// Executes configured rules against a set of files.
///
/// Rules are shared read-only between worker threads; every (file, rule)
/// pair measures into its own collection of data points.
pub struct Runner {
    base_dir: PathBuf,
    excluded: GlobSet,
}

impl Runner {
    /// Create a new runner. Reported paths are relative to `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            excluded: GlobSet::empty(),
        }
    }

    /// Skip files matching any of these globs.
    pub fn exclude(mut self, excluded: GlobSet) -> Self {
        self.excluded = excluded;
        self
    }

    /// Run every rule over every file it handles.
    pub fn run(&self, files: &[PathBuf], rules: &[ConfiguredRule]) -> RunResult {
        let scanned = AtomicUsize::new(0);
        let skipped = Mutex::new(Vec::new());

        let file_results: Vec<Vec<ReportedViolation>> = files
            .par_iter()
            .filter(|file| !self.is_excluded(file))
            .map(|file| {
                let rel_path = self.display_path(file);
                match self.check_file(file, &rel_path, rules) {
                    Ok(Some(violations)) => {
                        scanned.fetch_add(1, Ordering::Relaxed);
                        violations
                    }
                    Ok(None) => Vec::new(),
                    Err(e) => {
                        warn!(file = %rel_path, error = %e, "skipping file");
                        if let Ok(mut skipped) = skipped.lock() {
                            skipped.push(rel_path);
                        }
                        Vec::new()
                    }
                }
            })
            .collect();

        let mut result = RunResult {
            violations: file_results.into_iter().flatten().collect(),
            scanned: scanned.into_inner(),
            skipped: skipped.into_inner().unwrap_or_default(),
        };
        result.sort();
        debug!(
            scanned = result.scanned,
            violations = result.violations.len(),
            "run finished"
        );
        result
    }

    /// `Ok(None)` when no rule handles the file.
    fn check_file(
        &self,
        path: &Path,
        rel_path: &str,
        rules: &[ConfiguredRule],
    ) -> anyhow::Result<Option<Vec<ReportedViolation>>> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let applicable: Vec<&ConfiguredRule> = rules
            .iter()
            .filter(|rule| rule.rule().handles_extension(ext))
            .collect();
        if applicable.is_empty() {
            return Ok(None);
        }

        let source = std::fs::read(path)?;
        let mut violations = Vec::new();
        for rule in applicable {
            let measurements = rule.rule().measure(&source)?;
            debug!(
                file = %rel_path,
                rule = rule.name(),
                points = measurements.points.len(),
                "measured"
            );
            for violation in rule.apply(&measurements) {
                let line = measurements.label(violation.node).map_or(0, |l| l.line);
                violations.push(ReportedViolation {
                    rule: rule.name().to_string(),
                    file: rel_path.to_string(),
                    line,
                    message: rule.message_for(&violation),
                    parameters: violation.parameters,
                    severity: rule.severity(),
                });
            }
        }
        Ok(Some(violations))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.base_dir).unwrap_or(path);
        self.excluded.is_match(relative) || self.excluded.is_match(path)
    }

    fn display_path(&self, path: &Path) -> String {
        if path == self.base_dir {
            return path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string());
        }
        path.strip_prefix(&self.base_dir)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| path.to_string_lossy().to_string())
    }
}
