//! Method reference properties.
//!
//! A method reference names a type, a method and its parameter types:
//!
//! ```text
//! String#isEmpty()
//! String#indexOf(int)
//! String#substring(int,int)
//! java.util.Arrays#sort(int[])
//! ```
//!
//! The type may be an alias or a qualified name. If the method is not
//! declared on the named type, its ancestors are searched in order; the
//! resolved signature records the type that actually declares it.

use std::sync::Arc;

use crate::error::{ConfigurationError, ParseError, PropertyError, ResolutionError, ValidationError};
use crate::types::{TypeId, TypeNameRegistry, TypeRef};

use super::{NamespaceConstraint, PropertyDescriptor, PropertyMeta, PropertyType, PropertyValue};

pub const CLASS_METHOD_DELIMITER: char = '#';
pub const METHOD_ARG_DELIMITER: char = ',';
pub const METHOD_GROUP_DELIMITERS: [char; 2] = ['(', ')'];

/// Characters that can appear inside one reference.
const RESERVED: &[char] = &['#', ',', '(', ')', '[', ']', '.', '_', '$'];

/// A resolved method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub declaring_type: TypeId,
    pub method_name: String,
    pub parameter_types: Vec<TypeRef>,
}

/// Syntactic pieces of a reference, before any lookup.
#[derive(Debug, PartialEq, Eq)]
struct RawReference<'a> {
    type_name: &'a str,
    method_name: &'a str,
    arguments: Vec<&'a str>,
}

fn split_reference(input: &str) -> Result<RawReference<'_>, ParseError> {
    let (type_name, rest) = input
        .split_once(CLASS_METHOD_DELIMITER)
        .ok_or_else(|| ParseError::invalid_format(input, "missing '#'"))?;
    let type_name = type_name.trim();
    if type_name.is_empty() {
        return Err(ParseError::invalid_format(input, "missing type name"));
    }

    let [open, close] = METHOD_GROUP_DELIMITERS;
    let Some(open_at) = rest.find(open) else {
        if rest.contains(close) {
            return Err(ParseError::UnbalancedGroup {
                input: input.to_string(),
            });
        }
        let method_name = rest.trim();
        if method_name.is_empty() {
            return Err(ParseError::MissingMethodName {
                input: input.to_string(),
            });
        }
        return Ok(RawReference {
            type_name,
            method_name,
            arguments: Vec::new(),
        });
    };

    let method_name = rest[..open_at].trim();
    if method_name.is_empty() {
        return Err(ParseError::MissingMethodName {
            input: input.to_string(),
        });
    }

    let group = &rest[open_at + 1..];
    let close_at = group.find(close).ok_or_else(|| ParseError::UnbalancedGroup {
        input: input.to_string(),
    })?;
    let interior = &group[..close_at];
    if interior.contains(open) {
        return Err(ParseError::UnbalancedGroup {
            input: input.to_string(),
        });
    }
    if !group[close_at + 1..].trim().is_empty() {
        return Err(ParseError::invalid_format(input, "unexpected text after ')'"));
    }

    let arguments = if interior.trim().is_empty() {
        Vec::new()
    } else {
        let arguments: Vec<&str> = interior.split(METHOD_ARG_DELIMITER).map(str::trim).collect();
        if arguments.iter().any(|arg| arg.is_empty()) {
            return Err(ParseError::invalid_format(input, "empty argument type"));
        }
        arguments
    };

    Ok(RawReference {
        type_name,
        method_name,
        arguments,
    })
}

/// Parse and resolve a method reference against `registry`.
pub fn parse_method(registry: &TypeNameRegistry, text: &str) -> Result<MethodSignature, PropertyError> {
    let input = text.trim();
    let raw = split_reference(input)?;

    let owner = registry
        .resolve(raw.type_name)
        .ok_or_else(|| ResolutionError::UnknownType {
            name: raw.type_name.to_string(),
        })?;
    let parameter_types = raw
        .arguments
        .iter()
        .map(|arg| registry.resolve_ref(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let declaring_type = registry
        .find_method(owner, raw.method_name, &parameter_types)
        .ok_or_else(|| ResolutionError::MethodNotFound {
            type_name: registry.qualified_name(owner).to_string(),
            method: format!("{}({})", raw.method_name, raw.arguments.join(",")),
        })?;

    Ok(MethodSignature {
        declaring_type,
        method_name: raw.method_name.to_string(),
        parameter_types,
    })
}

/// Serialize a signature in reference syntax, preferring aliases.
pub fn format_method(registry: &TypeNameRegistry, signature: &MethodSignature) -> String {
    let arguments: Vec<String> = signature
        .parameter_types
        .iter()
        .map(|param| registry.type_name(param))
        .collect();
    format!(
        "{}{}{}{}{}{}",
        registry.short_name(signature.declaring_type),
        CLASS_METHOD_DELIMITER,
        signature.method_name,
        METHOD_GROUP_DELIMITERS[0],
        arguments.join(&METHOD_ARG_DELIMITER.to_string()),
        METHOD_GROUP_DELIMITERS[1],
    )
}

/// Property whose values are method references, optionally limited to
/// methods declared in legal namespaces.
#[derive(Debug, Clone)]
pub struct MethodProperty {
    meta: PropertyMeta,
    default: PropertyValue<MethodSignature>,
    registry: Arc<TypeNameRegistry>,
    namespaces: NamespaceConstraint,
}

impl MethodProperty {
    pub fn new(meta: PropertyMeta, registry: Arc<TypeNameRegistry>) -> Result<Self, ConfigurationError> {
        meta.check_delimiter(RESERVED)?;
        Ok(Self {
            meta,
            default: PropertyValue::Absent,
            registry,
            namespaces: NamespaceConstraint::unconstrained(),
        })
    }

    pub fn with_default(mut self, default: PropertyValue<MethodSignature>) -> Self {
        self.default = default;
        self
    }

    pub fn legal_namespaces(mut self, namespaces: NamespaceConstraint) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn namespaces(&self) -> &NamespaceConstraint {
        &self.namespaces
    }

    pub fn registry(&self) -> &TypeNameRegistry {
        &self.registry
    }
}

impl PropertyDescriptor for MethodProperty {
    type Item = MethodSignature;

    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn property_type(&self) -> PropertyType {
        PropertyType::Method
    }

    fn default_value(&self) -> &PropertyValue<MethodSignature> {
        &self.default
    }

    fn item_from(&self, text: &str) -> Result<MethodSignature, PropertyError> {
        parse_method(&self.registry, text)
    }

    fn item_as_string(&self, item: &MethodSignature) -> String {
        format_method(&self.registry, item)
    }

    fn item_error(&self, item: &MethodSignature) -> Option<ValidationError> {
        let owner = self.registry.qualified_name(item.declaring_type);
        self.namespaces
            .check("method", &self.item_as_string(item), owner)
            .err()
    }
}
