//! Command-line interface for rulecore.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::detect::Runner;
use crate::property::{
    MethodProperty, NamespaceConstraint, PropertyDescriptor, PropertyMeta,
};
use crate::report;
use crate::rules;
use crate::ruleset::{self, RuleSet};
use crate::types::{self, TypeCatalog, TypeNameRegistry};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default rule set file names to search for.
const DEFAULT_RULESET_NAMES: &[&str] = &["rulecore.yaml", ".rulecore.yaml"];

/// Starting point written by `rulecore init`.
const RULESET_TEMPLATE: &str = include_str!("templates/ruleset.yaml");

/// Statistical code rules with typed, validated properties.
///
/// Rules measure every node of interest in a source file and report the
/// ones whose score exceeds a fixed minimum or stands out statistically.
#[derive(Parser)]
#[command(name = "rulecore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a rule set against a file or directory
    Check(CheckArgs),
    /// Parse and validate method references
    Method(MethodArgs),
    /// Print the type alias table
    Aliases(CatalogArgs),
    /// List built-in rules and their properties
    Rules(CatalogArgs),
    /// Write a starter rule set
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to rule set YAML file (default: auto-discover, else all rules)
    #[arg(short, long)]
    pub ruleset: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Arguments for the method command.
#[derive(Parser)]
pub struct MethodArgs {
    /// References such as `String#indexOf(int)`
    #[arg(required = true)]
    pub references: Vec<String>,

    /// Legal namespace prefix (repeatable)
    #[arg(short, long = "namespace")]
    pub namespaces: Vec<String>,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Type catalog selection shared by several commands.
#[derive(Parser)]
pub struct CatalogArgs {
    /// Type catalog YAML file (default: built-in Java catalog)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "rulecore.yaml")]
    pub output: PathBuf,
}

fn load_registry(args: &CatalogArgs) -> anyhow::Result<Arc<TypeNameRegistry>> {
    match &args.catalog {
        Some(path) => {
            let registry = TypeCatalog::parse_file(path)?.build()?;
            Ok(Arc::new(registry))
        }
        None => Ok(types::builtin()?),
    }
}

/// Discover a rule set file in the current directory.
fn discover_ruleset() -> Option<PathBuf> {
    DEFAULT_RULESET_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Collect files with one of the given extensions.
fn collect_files(root: &Path, extensions: &[&str]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden and build output directories
            if e.file_type().is_dir() && e.depth() > 0 {
                return !(name.starts_with('.')
                    || name == "target"
                    || name == "build"
                    || name == "node_modules");
            }
            true
        })
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if extensions.contains(&ext) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let registry = load_registry(&args.catalog)?;

    let ruleset_path = args.ruleset.clone().or_else(discover_ruleset);
    let ruleset = match &ruleset_path {
        Some(path) => match RuleSet::parse_file(path) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error parsing rule set: {}", e);
                return Ok(EXIT_ERROR);
            }
        },
        None => RuleSet::all_rules(),
    };
    let ruleset_name = ruleset_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "(built-in rules)".to_string());

    let exclusions = match ruleset.exclusions() {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Error: invalid rule set: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let loaded = ruleset::load(&ruleset, registry);

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut extensions: Vec<&str> = loaded
        .rules
        .iter()
        .flat_map(|rule| rule.rule().file_extensions().iter().copied())
        .collect();
    extensions.sort_unstable();
    extensions.dedup();

    let files = if abs_path.is_dir() {
        collect_files(&abs_path, &extensions)?
    } else {
        vec![abs_path.clone()]
    };
    if files.is_empty() {
        eprintln!("Warning: no files to scan");
    }

    let runner = Runner::new(&abs_path).exclude(exclusions);
    let result = runner.run(&files, &loaded.rules);

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &ruleset_name, &result, &loaded.failures)?,
        _ => report::write_pretty(&path_str, &ruleset_name, &result, &loaded.failures),
    }

    if !loaded.is_clean() {
        Ok(EXIT_ERROR)
    } else if result.is_clean() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the method command: echo the canonical form of each valid reference.
pub fn run_method(args: &MethodArgs) -> anyhow::Result<i32> {
    let registry = load_registry(&args.catalog)?;
    let property = MethodProperty::new(PropertyMeta::new("method", "", 0.0), registry)?
        .legal_namespaces(NamespaceConstraint::new(&args.namespaces));

    let mut failed = false;
    for reference in &args.references {
        let problem = match property.value_from(reference) {
            Ok(value) if value.is_absent() => "empty reference".to_string(),
            Ok(value) => match property.error_for(&value) {
                None => {
                    println!("  {} {}", "✓".green(), property.as_string(&value));
                    continue;
                }
                Some(message) => message,
            },
            Err(e) => e.to_string(),
        };
        failed = true;
        println!("  {} {}", "✗".red(), reference);
        println!("      {}", problem.dimmed());
    }

    Ok(if failed { EXIT_FAILED } else { EXIT_SUCCESS })
}

/// Print the alias table.
pub fn run_aliases(args: &CatalogArgs) -> anyhow::Result<i32> {
    let registry = load_registry(args)?;
    for (alias, qualified) in registry.aliases() {
        println!("  {:<20} {}", alias, qualified);
    }
    Ok(EXIT_SUCCESS)
}

/// List built-in rules with their properties and defaults.
pub fn run_rules(args: &CatalogArgs) -> anyhow::Result<i32> {
    let registry = load_registry(args)?;
    println!("Available rules:");
    println!();

    for entry in rules::available() {
        println!("  {}", entry.name.bold());
        println!("    {}", entry.description);
        let rule = (entry.factory)(Arc::clone(&registry))?;
        for (name, value) in rule.properties().to_strings() {
            let descriptor = rule.properties().descriptor(&name);
            let kind = descriptor
                .map(|d| d.property_type().to_string())
                .unwrap_or_default();
            let value = if value.is_empty() { "-".to_string() } else { value };
            match descriptor.and_then(|d| d.namespaces()) {
                Some(namespaces) => println!(
                    "      {:<16} {:<8} {} {}",
                    name,
                    kind.dimmed(),
                    value,
                    format!("(in {})", namespaces.prefixes().join(", ")).dimmed()
                ),
                None => println!("      {:<16} {:<8} {}", name, kind.dimmed(), value),
            }
        }
        println!();
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, RULESET_TEMPLATE) {
        eprintln!("Error: failed to write rule set: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to tune thresholds", args.output.display());
    println!("  2. Run: rulecore check . --ruleset {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses() {
        let ruleset = RuleSet::from_str(RULESET_TEMPLATE).unwrap();
        assert!(!ruleset.rules.is_empty());
        assert!(ruleset.exclusions().is_ok());
    }

    #[test]
    fn test_collect_files_skips_hidden_and_build_dirs() {
        let temp = TempDir::new().unwrap();
        for dir in ["src", ".git", "target"] {
            std::fs::create_dir(temp.path().join(dir)).unwrap();
            std::fs::write(temp.path().join(dir).join("A.java"), "class A {}").unwrap();
        }
        std::fs::write(temp.path().join("src").join("notes.md"), "").unwrap();

        let files = collect_files(temp.path(), &["java"]).unwrap();
        assert_eq!(files, vec![temp.path().join("src").join("A.java")]);
    }
}
