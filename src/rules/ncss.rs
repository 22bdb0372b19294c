//! Constructor size measured in non-commenting source statements.
//!
//! Every constructor scores one for its declaration plus one per statement
//! in its body, nested statements included. An `else` branch adds one on top
//! of its `if`. Statements inside the bodies of anonymous or local classes,
//! enums, interfaces and annotation types belong to those types and are not
//! counted.

use std::sync::Arc;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::error::ConfigurationError;
use crate::property::{MethodProperty, MethodSignature, NamespaceConstraint, PropertyMeta, PropertySet};
use crate::stat::NodeRef;
use crate::types::TypeNameRegistry;

use super::{define_threshold_properties, Measurements, NodeLabel, StatisticalRule};

pub const NAME: &str = "NcssConstructorCount";
pub const DESCRIPTION: &str = "Constructors with too many non-commenting source statements";
pub const DEFAULT_MINIMUM: f64 = 100.0;
pub const IGNORED_CALLS: &str = "ignoredCalls";

const MESSAGE: &str = "The constructor {0} has an NCSS line count of {1}";

const CONSTRUCTOR_QUERY: &str = r#"
(constructor_declaration) @constructor
"#;

/// Bodies of nested type declarations.
const TYPE_BODY_KINDS: &[&str] = &[
    "class_body",
    "enum_body",
    "interface_body",
    "annotation_type_body",
];

/// Node kinds that count as one statement each.
const STATEMENT_KINDS: &[&str] = &[
    "expression_statement",
    "local_variable_declaration",
    "explicit_constructor_invocation",
    "if_statement",
    "for_statement",
    "enhanced_for_statement",
    "while_statement",
    "do_statement",
    "return_statement",
    "throw_statement",
    "break_statement",
    "continue_statement",
    "try_statement",
    "try_with_resources_statement",
    "catch_clause",
    "finally_clause",
    "switch_block_statement_group",
    "switch_rule",
    "synchronized_statement",
    "labeled_statement",
    "assert_statement",
    "yield_statement",
];

pub fn factory(registry: Arc<TypeNameRegistry>) -> Result<Box<dyn StatisticalRule>, ConfigurationError> {
    Ok(Box::new(NcssConstructorCount::new(registry)?))
}

pub struct NcssConstructorCount {
    properties: PropertySet,
    language: Language,
    query: Query,
}

impl NcssConstructorCount {
    pub fn new(registry: Arc<TypeNameRegistry>) -> Result<Self, ConfigurationError> {
        let mut properties = PropertySet::new(NAME);
        define_threshold_properties(&mut properties, Some(DEFAULT_MINIMUM))?;

        // Calls to these helpers do not make a constructor any bigger.
        let ignored = PropertyMeta::new(
            IGNORED_CALLS,
            "Library calls that are not counted as statements",
            4.0,
        )
        .multi_valued(' ');
        properties.define(
            MethodProperty::new(ignored, registry)?
                .legal_namespaces(NamespaceConstraint::new(["java.lang", "java.util"])),
        )?;

        let language: Language = tree_sitter_java::LANGUAGE.into();
        let query = Query::new(&language, CONSTRUCTOR_QUERY)
            .map_err(|e| ConfigurationError::RuleSetup(format!("{}: {}", NAME, e)))?;

        Ok(Self {
            properties,
            language,
            query,
        })
    }

    fn parse(&self, source: &[u8]) -> anyhow::Result<tree_sitter::Tree> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse source"))
    }

    fn count_statements(&self, body: Node, source: &[u8], ignored: &[MethodSignature]) -> usize {
        let mut count = 0;
        let mut stack = vec![body];
        while let Some(node) = stack.pop() {
            let kind = node.kind();
            if TYPE_BODY_KINDS.contains(&kind) {
                continue;
            }
            if STATEMENT_KINDS.contains(&kind) && !is_ignored_call(node, source, ignored) {
                count += 1;
                if kind == "if_statement" && node.child_by_field_name("alternative").is_some() {
                    count += 1;
                }
            }
            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }
        count
    }
}

impl StatisticalRule for NcssConstructorCount {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn message(&self) -> &str {
        MESSAGE
    }

    fn properties(&self) -> &PropertySet {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn measure(&self, source: &[u8]) -> anyhow::Result<Measurements> {
        let tree = self.parse(source)?;
        let ignored = self.properties.methods(IGNORED_CALLS);

        let mut measurements = Measurements::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), source);
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let constructor = capture.node;
                let statements = constructor
                    .child_by_field_name("body")
                    .map_or(0, |body| self.count_statements(body, source, &ignored));
                let label = NodeLabel {
                    name: constructor_label(constructor, source),
                    line: constructor.start_position().row + 1,
                };
                measurements.record(NodeRef(constructor.id()), (1 + statements) as f64, label);
            }
        }
        Ok(measurements)
    }
}

/// `Name(Type,Type)` from the declaration's name and formal parameter types.
fn constructor_label(constructor: Node, source: &[u8]) -> String {
    let name = constructor
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
        .unwrap_or("<init>");
    let mut types = Vec::new();
    if let Some(params) = constructor.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            let ty = match param.kind() {
                "formal_parameter" => param.child_by_field_name("type"),
                // varargs: the type is the first child after any modifiers
                "spread_parameter" => {
                    let mut inner = param.walk();
                    let first = param
                        .named_children(&mut inner)
                        .find(|child| child.kind() != "modifiers");
                    first
                }
                _ => None,
            };
            if let Some(ty) = ty {
                types.push(ty.utf8_text(source).unwrap_or(""));
            }
        }
    }
    format!("{}({})", name, types.join(","))
}

/// An expression statement that only calls one of the ignored methods.
/// Calls are matched by method name and argument count.
fn is_ignored_call(node: Node, source: &[u8], ignored: &[MethodSignature]) -> bool {
    if ignored.is_empty() || node.kind() != "expression_statement" {
        return false;
    }
    let Some(call) = node.named_child(0) else {
        return false;
    };
    if call.kind() != "method_invocation" {
        return false;
    }
    let name = call
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
        .unwrap_or("");
    let arity = call
        .child_by_field_name("arguments")
        .map_or(0, |args| args.named_child_count());
    ignored
        .iter()
        .any(|sig| sig.method_name == name && sig.parameter_types.len() == arity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types;

    fn rule() -> NcssConstructorCount {
        NcssConstructorCount::new(types::builtin().unwrap()).unwrap()
    }

    fn scores(rule: &NcssConstructorCount, source: &str) -> Vec<(String, f64)> {
        let measurements = rule.measure(source.as_bytes()).unwrap();
        measurements
            .points
            .iter()
            .map(|p| (measurements.identify(p.node), p.score))
            .collect()
    }

    #[test]
    fn test_empty_constructor_scores_one() {
        let source = "class A { A() {} }";
        assert_eq!(scores(&rule(), source), vec![("A()".to_string(), 1.0)]);
    }

    #[test]
    fn test_counts_nested_statements() {
        let source = r#"
class A {
    A(int x, String y) {
        this(x);
        if (x > 0) {
            x--;
        } else {
            return;
        }
        int z = x;
        while (z > 0) { z--; }
    }
    void m() { int ignored = 0; }
}
"#;
        // this(), if, else, x--, return, int z, while, z--
        assert_eq!(scores(&rule(), source), vec![("A(int,String)".to_string(), 9.0)]);
    }

    #[test]
    fn test_anonymous_class_bodies_are_skipped() {
        let source = r#"
class A {
    A() {
        Runnable r = new Runnable() {
            public void run() { int a = 1; int b = 2; }
        };
    }
}
"#;
        assert_eq!(scores(&rule(), source), vec![("A()".to_string(), 2.0)]);
    }

    #[test]
    fn test_local_type_bodies_are_skipped() {
        let source = r#"
class A {
    A() {
        enum Mode {
            ON, OFF;
            Mode() { int a = 1; int b = 2; int c = 3; }
        }
        interface Callback {
            default void run() { int d = 4; int e = 5; }
        }
    }
}
"#;
        let scores = scores(&rule(), source);
        assert_eq!(scores[0], ("A()".to_string(), 1.0));
    }

    #[test]
    fn test_ignored_calls_are_not_counted() {
        let source = r#"
class A {
    A(Object o) {
        java.util.Objects.requireNonNull(o);
        System.out.println("x");
    }
}
"#;
        let mut rule = rule();
        assert_eq!(scores(&rule, source)[0].1, 3.0);
        rule.properties_mut()
            .configure(IGNORED_CALLS, "java.util.Objects#requireNonNull(Object)")
            .unwrap();
        assert_eq!(scores(&rule, source)[0].1, 2.0);
    }

    #[test]
    fn test_ignored_calls_outside_namespaces_are_rejected() {
        let mut rule = rule();
        let err = rule
            .properties_mut()
            .configure(IGNORED_CALLS, "java.io.PrintStream#println(String)")
            .unwrap_err();
        assert!(err.to_string().contains("java.io.PrintStream"));
    }

    #[test]
    fn test_constructors_in_traversal_order() {
        let source = r#"
class Outer {
    Outer() { int a = 1; }
    static class Inner {
        Inner() {}
    }
    Outer(int a) {}
}
"#;
        let names: Vec<String> = scores(&rule(), source).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Outer()", "Inner()", "Outer(int)"]);
    }
}
