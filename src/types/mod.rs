//! Type names, aliases and the method table used to resolve references.
//!
//! This module provides:
//! - `TypeNameRegistry`: alias lookup plus an arena of types with parent
//!   indices and declared methods
//! - `RegistryBuilder`: incremental construction, validated on `build`
//! - `catalog`: YAML type catalogs and the embedded built-in Java catalog
//!
//! A registry is immutable once built. Share it behind an `Arc` and pass it
//! to the descriptors that need it.

use std::collections::HashMap;

use crate::error::{ConfigurationError, ParseError, PropertyError, ResolutionError};

pub mod catalog;
mod shortcuts;

pub use catalog::{builtin, CatalogType, TypeCatalog};

/// Suffix marking an array of the preceding type.
pub const ARRAY_FLAG: &str = "[]";

/// Index of a type inside the registry that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A type usage: a base type with zero or more array dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub base: TypeId,
    pub dimensions: u8,
}

impl TypeRef {
    pub fn plain(base: TypeId) -> Self {
        Self {
            base,
            dimensions: 0,
        }
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }
}

/// A method declared directly on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<TypeRef>,
}

/// A type in the registry arena.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub qualified_name: String,
    pub parent: Option<TypeId>,
    pub methods: Vec<MethodInfo>,
}

/// Bidirectional alias table over an explicit type/method arena.
#[derive(Debug, Clone)]
pub struct TypeNameRegistry {
    types: Vec<TypeInfo>,
    by_name: HashMap<String, TypeId>,
    aliases: HashMap<String, TypeId>,
    short_names: HashMap<TypeId, String>,
}

impl TypeNameRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve an alias or a qualified name. Aliases win.
    pub fn resolve(&self, name: &str) -> Option<TypeId> {
        self.aliases
            .get(name)
            .or_else(|| self.by_name.get(name))
            .copied()
    }

    /// Parse a type usage such as `int`, `String[]` or `java.util.List[][]`.
    pub fn resolve_ref(&self, text: &str) -> Result<TypeRef, PropertyError> {
        parse_type_ref(text, |name| self.resolve(name))
    }

    /// The shortest alias registered for `qualified`, or `qualified` itself.
    pub fn short_name_for<'a>(&'a self, qualified: &'a str) -> &'a str {
        self.by_name
            .get(qualified)
            .and_then(|id| self.short_names.get(id))
            .map_or(qualified, String::as_str)
    }

    /// The display name of a type: its alias when it has one.
    pub fn short_name(&self, id: TypeId) -> &str {
        match self.short_names.get(&id) {
            Some(alias) => alias,
            None => self.qualified_name(id),
        }
    }

    pub fn qualified_name(&self, id: TypeId) -> &str {
        self.info(id)
            .map_or("<unknown>", |info| info.qualified_name.as_str())
    }

    /// Render a type usage with its short name and one `[]` per dimension.
    pub fn type_name(&self, type_ref: &TypeRef) -> String {
        let mut name = self.short_name(type_ref.base).to_string();
        for _ in 0..type_ref.dimensions {
            name.push_str(ARRAY_FLAG);
        }
        name
    }

    pub fn info(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.index())
    }

    /// Iterate over `id` and then each parent in turn.
    pub fn ancestors(&self, id: TypeId) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            next: self.info(id).map(|_| id),
        }
    }

    /// Find the type declaring `name(parameters)`, starting at `owner` and
    /// walking up the parent chain.
    pub fn find_method(&self, owner: TypeId, name: &str, parameters: &[TypeRef]) -> Option<TypeId> {
        self.ancestors(owner).find(|&id| {
            self.info(id).is_some_and(|info| {
                info.methods
                    .iter()
                    .any(|m| m.name == name && m.parameters == parameters)
            })
        })
    }

    /// The alias table as `(alias, qualified name)` pairs, sorted by alias.
    pub fn aliases(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .aliases
            .iter()
            .map(|(alias, id)| (alias.as_str(), self.qualified_name(*id)))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

/// Iterator over a type and its ancestors.
pub struct Ancestors<'a> {
    registry: &'a TypeNameRegistry,
    next: Option<TypeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = TypeId;

    fn next(&mut self) -> Option<TypeId> {
        let current = self.next?;
        self.next = self.registry.info(current).and_then(|info| info.parent);
        Some(current)
    }
}

/// Incremental registry construction.
///
/// Parents must be declared before their children, so every parent chain
/// terminates.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<TypeInfo>,
    by_name: HashMap<String, TypeId>,
    aliases: HashMap<String, TypeId>,
}

impl RegistryBuilder {
    /// Declare a type, optionally extending an already declared parent.
    pub fn declare_type(
        &mut self,
        qualified_name: &str,
        parent: Option<&str>,
    ) -> Result<TypeId, ConfigurationError> {
        if self.by_name.contains_key(qualified_name) {
            return Err(ConfigurationError::DuplicateType(qualified_name.to_string()));
        }
        let parent = match parent {
            Some(name) => Some(self.lookup(name).ok_or_else(|| {
                ConfigurationError::UnknownParent {
                    child: qualified_name.to_string(),
                    parent: name.to_string(),
                }
            })?),
            None => None,
        };

        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeInfo {
            qualified_name: qualified_name.to_string(),
            parent,
            methods: Vec::new(),
        });
        self.by_name.insert(qualified_name.to_string(), id);
        Ok(id)
    }

    /// Register `alias` as a short name for `id`.
    pub fn alias(&mut self, alias: &str, id: TypeId) -> Result<(), ConfigurationError> {
        match self.aliases.get(alias) {
            Some(existing) if *existing != id => Err(ConfigurationError::AliasConflict {
                alias: alias.to_string(),
                existing: self.types[existing.index()].qualified_name.clone(),
            }),
            _ => {
                self.aliases.insert(alias.to_string(), id);
                Ok(())
            }
        }
    }

    /// Declare a method directly on `owner`.
    pub fn add_method(&mut self, owner: TypeId, name: &str, parameters: Vec<TypeRef>) {
        if let Some(info) = self.types.get_mut(owner.index()) {
            info.methods.push(MethodInfo {
                name: name.to_string(),
                parameters,
            });
        }
    }

    /// Resolve a name against what has been declared so far.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.aliases
            .get(name)
            .or_else(|| self.by_name.get(name))
            .copied()
    }

    pub fn resolve_ref(&self, text: &str) -> Result<TypeRef, PropertyError> {
        parse_type_ref(text, |name| self.lookup(name))
    }

    /// Freeze the registry. Fails if an alias shadows another type's
    /// qualified name.
    pub fn build(self) -> Result<TypeNameRegistry, ConfigurationError> {
        for (alias, id) in &self.aliases {
            if let Some(named) = self.by_name.get(alias) {
                if named != id {
                    return Err(ConfigurationError::AliasConflict {
                        alias: alias.clone(),
                        existing: alias.clone(),
                    });
                }
            }
        }

        let mut short_names: HashMap<TypeId, String> = HashMap::new();
        for (alias, id) in &self.aliases {
            let replace = match short_names.get(id) {
                Some(current) => (alias.len(), alias.as_str()) < (current.len(), current.as_str()),
                None => alias.len() < self.types[id.index()].qualified_name.len(),
            };
            if replace {
                short_names.insert(*id, alias.clone());
            }
        }

        Ok(TypeNameRegistry {
            types: self.types,
            by_name: self.by_name,
            aliases: self.aliases,
            short_names,
        })
    }
}

/// Parse `name` followed by any number of `[]` suffixes.
fn parse_type_ref<F>(text: &str, lookup: F) -> Result<TypeRef, PropertyError>
where
    F: Fn(&str) -> Option<TypeId>,
{
    let mut base = text.trim();
    let mut dimensions = 0u8;
    while let Some(element) = base.strip_suffix(ARRAY_FLAG) {
        base = element.trim_end();
        dimensions = dimensions
            .checked_add(1)
            .ok_or_else(|| ParseError::invalid_format(text, "too many array dimensions"))?;
    }
    if base.is_empty() {
        return Err(ParseError::invalid_format(text, "empty type name").into());
    }

    let id = lookup(base).ok_or_else(|| ResolutionError::UnknownType {
        name: base.to_string(),
    })?;
    Ok(TypeRef {
        base: id,
        dimensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_registry() -> TypeNameRegistry {
        let mut builder = TypeNameRegistry::builder();
        let object = builder.declare_type("lang.Object", None).unwrap();
        let base = builder.declare_type("lang.Base", Some("lang.Object")).unwrap();
        let child = builder.declare_type("lang.Child", Some("lang.Base")).unwrap();
        let int = builder.declare_type("int", None).unwrap();
        builder.alias("Object", object).unwrap();
        builder.alias("Obj", object).unwrap();
        builder.alias("Child", child).unwrap();
        builder.add_method(object, "hash", vec![]);
        builder.add_method(base, "size", vec![]);
        builder.add_method(child, "get", vec![TypeRef::plain(int)]);
        builder.build().unwrap()
    }

    #[test]
    fn test_resolve_alias_and_qualified() {
        let registry = small_registry();
        let child = registry.resolve("Child").unwrap();
        assert_eq!(registry.resolve("lang.Child"), Some(child));
        assert_eq!(registry.qualified_name(child), "lang.Child");
        assert!(registry.resolve("Missing").is_none());
    }

    #[test]
    fn test_short_name_prefers_shortest_alias() {
        let registry = small_registry();
        assert_eq!(registry.short_name_for("lang.Object"), "Obj");
        assert_eq!(registry.short_name_for("lang.Base"), "lang.Base");
        assert_eq!(registry.short_name_for("not.Registered"), "not.Registered");
    }

    #[test]
    fn test_find_method_walks_ancestors() {
        let registry = small_registry();
        let child = registry.resolve("Child").unwrap();
        let base = registry.resolve("lang.Base").unwrap();
        let object = registry.resolve("Object").unwrap();
        assert_eq!(registry.find_method(child, "size", &[]), Some(base));
        assert_eq!(registry.find_method(child, "hash", &[]), Some(object));
        assert_eq!(registry.find_method(child, "size", &[TypeRef::plain(child)]), None);
        assert_eq!(registry.ancestors(child).count(), 3);
    }

    #[test]
    fn test_nested_array_refs() {
        let registry = small_registry();
        let type_ref = registry.resolve_ref("int[][]").unwrap();
        assert_eq!(type_ref.dimensions, 2);
        assert_eq!(registry.type_name(&type_ref), "int[][]");
        assert!(matches!(
            registry.resolve_ref("[]"),
            Err(PropertyError::Parse(ParseError::InvalidFormat { .. }))
        ));
        assert!(matches!(
            registry.resolve_ref("float[]"),
            Err(PropertyError::Resolution(ResolutionError::UnknownType { .. }))
        ));
    }

    #[test]
    fn test_builder_rejects_bad_declarations() {
        let mut builder = TypeNameRegistry::builder();
        let a = builder.declare_type("a.A", None).unwrap();
        let b = builder.declare_type("a.B", None).unwrap();
        assert_eq!(
            builder.declare_type("a.A", None),
            Err(ConfigurationError::DuplicateType("a.A".to_string()))
        );
        assert!(matches!(
            builder.declare_type("a.C", Some("a.Missing")),
            Err(ConfigurationError::UnknownParent { .. })
        ));
        builder.alias("A", a).unwrap();
        assert!(builder.alias("A", b).is_err());
        builder.alias("a.A", b).unwrap();
        assert!(builder.build().is_err());
    }
}
