//! YAML type catalogs.
//!
//! A catalog lists types in declaration order. Each entry names its parent
//! (which must appear earlier), optional aliases, and its methods written as
//! `name(argType,argType)`:
//!
//! ```yaml
//! types:
//!   - name: java.lang.Object
//!     methods: ["hashCode()", "equals(Object)"]
//!   - name: java.lang.String
//!     parent: java.lang.Object
//!     methods: ["indexOf(int)", "substring(int,int)"]
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{shortcuts, RegistryBuilder, TypeNameRegistry, TypeRef};
use crate::error::ConfigurationError;

const BUILTIN_CATALOG: &str = include_str!("java.yaml");

lazy_static::lazy_static! {
    /// The built-in Java catalog, parsed on first use.
    static ref BUILTIN: Result<Arc<TypeNameRegistry>, ConfigurationError> =
        TypeCatalog::from_yaml(BUILTIN_CATALOG)
            .and_then(|catalog| catalog.build())
            .map(Arc::new);
}

/// The process-wide registry built from the embedded Java catalog.
pub fn builtin() -> Result<Arc<TypeNameRegistry>, ConfigurationError> {
    BUILTIN.clone()
}

/// Top-level catalog document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TypeCatalog {
    #[serde(default)]
    pub types: Vec<CatalogType>,
}

/// One type declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogType {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Short names. When empty, a well-known shortcut is used if one exists.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
}

impl TypeCatalog {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigurationError> {
        serde_yaml::from_str(content).map_err(|e| ConfigurationError::CatalogSyntax(e.to_string()))
    }

    /// Parse a catalog from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Build an immutable registry.
    ///
    /// Types and aliases are declared first so method entries may refer to
    /// types declared later in the file.
    pub fn build(&self) -> Result<TypeNameRegistry, ConfigurationError> {
        let mut builder = TypeNameRegistry::builder();
        let mut ids = Vec::with_capacity(self.types.len());

        for entry in &self.types {
            let id = builder.declare_type(&entry.name, entry.parent.as_deref())?;
            if entry.aliases.is_empty() {
                if let Some(alias) = shortcuts::shortcut_for(&entry.name) {
                    builder.alias(alias, id)?;
                }
            }
            for alias in &entry.aliases {
                builder.alias(alias, id)?;
            }
            ids.push(id);
        }

        for (entry, id) in self.types.iter().zip(ids) {
            for method in &entry.methods {
                let (name, parameters) = parse_method_entry(&builder, &entry.name, method)?;
                builder.add_method(id, name, parameters);
            }
        }

        builder.build()
    }
}

fn parse_method_entry<'a>(
    builder: &RegistryBuilder,
    owner: &str,
    entry: &'a str,
) -> Result<(&'a str, Vec<TypeRef>), ConfigurationError> {
    let syntax = |reason: String| {
        ConfigurationError::CatalogSyntax(format!("{}: method {:?}: {}", owner, entry, reason))
    };

    let entry = entry.trim();
    let (name, rest) = entry
        .split_once('(')
        .ok_or_else(|| syntax("missing '('".to_string()))?;
    let args = rest
        .strip_suffix(')')
        .ok_or_else(|| syntax("missing ')'".to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(syntax("missing method name".to_string()));
    }

    if args.trim().is_empty() {
        return Ok((name, Vec::new()));
    }
    let parameters = args
        .split(',')
        .map(|arg| builder.resolve_ref(arg).map_err(|e| syntax(e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((name, parameters))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_builds() {
        let registry = builtin().expect("embedded catalog should build");
        assert!(registry.len() > 20);
        let string = registry.resolve("String").unwrap();
        assert_eq!(registry.qualified_name(string), "java.lang.String");
        assert_eq!(registry.short_name_for("java.util.List"), "java.util.List");
    }

    #[test]
    fn test_catalog_aliases_and_forward_references() {
        let yaml = r#"
types:
  - name: app.Node
    aliases: [Node, N]
    methods:
      - "link(app.Edge)"
      - "children()"
  - name: app.Edge
    methods: ["weight()"]
"#;
        let registry = TypeCatalog::from_yaml(yaml).unwrap().build().unwrap();
        let node = registry.resolve("N").unwrap();
        let edge = registry.resolve("app.Edge").unwrap();
        assert_eq!(registry.short_name(node), "N");
        assert_eq!(
            registry.find_method(node, "link", &[TypeRef::plain(edge)]),
            Some(node)
        );
    }

    #[test]
    fn test_catalog_rejects_bad_method_entries() {
        let yaml = r#"
types:
  - name: app.Node
    methods: ["link(app.Missing)"]
"#;
        let err = TypeCatalog::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigurationError::CatalogSyntax(_)));

        let yaml = "types:\n  - name: app.Node\n    methods: [\"broken\"]\n";
        assert!(TypeCatalog::from_yaml(yaml).unwrap().build().is_err());
    }

    #[test]
    fn test_catalog_rejects_parent_declared_later() {
        let yaml = r#"
types:
  - name: app.Child
    parent: app.Parent
  - name: app.Parent
"#;
        let err = TypeCatalog::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownParent { .. }));
    }
}
