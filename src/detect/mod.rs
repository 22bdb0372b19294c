//! Applying configured rules to source files.

mod runner;
mod types;

pub use runner::Runner;
pub use types::{ReportedViolation, RunResult, Severity};
