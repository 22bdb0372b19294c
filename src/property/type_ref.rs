//! Type reference properties: `String`, `java.util.List`, `int[]`.

use std::sync::Arc;

use crate::error::{ConfigurationError, PropertyError, ValidationError};
use crate::types::{TypeNameRegistry, TypeRef};

use super::{NamespaceConstraint, PropertyDescriptor, PropertyMeta, PropertyType, PropertyValue};

const RESERVED: &[char] = &['[', ']', '.', '_', '$'];

/// Property whose values are types, optionally limited to legal namespaces.
/// Array types are checked against their element type.
#[derive(Debug, Clone)]
pub struct TypeProperty {
    meta: PropertyMeta,
    default: PropertyValue<TypeRef>,
    registry: Arc<TypeNameRegistry>,
    namespaces: NamespaceConstraint,
}

impl TypeProperty {
    pub fn new(meta: PropertyMeta, registry: Arc<TypeNameRegistry>) -> Result<Self, ConfigurationError> {
        meta.check_delimiter(RESERVED)?;
        Ok(Self {
            meta,
            default: PropertyValue::Absent,
            registry,
            namespaces: NamespaceConstraint::unconstrained(),
        })
    }

    pub fn with_default(mut self, default: PropertyValue<TypeRef>) -> Self {
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
}

impl PropertyDescriptor for TypeProperty {
    type Item = TypeRef;

    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn property_type(&self) -> PropertyType {
        PropertyType::Type
    }

    fn default_value(&self) -> &PropertyValue<TypeRef> {
        &self.default
    }

    fn item_from(&self, text: &str) -> Result<TypeRef, PropertyError> {
        self.registry.resolve_ref(text)
    }

    fn item_as_string(&self, item: &TypeRef) -> String {
        self.registry.type_name(item)
    }

    fn item_error(&self, item: &TypeRef) -> Option<ValidationError> {
        let owner = self.registry.qualified_name(item.base);
        self.namespaces
            .check("type", &self.item_as_string(item), owner)
            .err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types;

    #[test]
    fn test_array_suffix_round_trip() {
        let prop = TypeProperty::new(PropertyMeta::new("type", "", 1.0), types::builtin().unwrap())
            .unwrap();
        let value = prop.value_from("int[]").unwrap();
        let item = value.first().copied().unwrap();
        assert!(item.is_array());
        assert_eq!(prop.as_string(&value), "int[]");
    }

    #[test]
    fn test_type_namespace_validation() {
        let meta = PropertyMeta::new("types", "", 1.0).multi_valued(' ');
        let prop = TypeProperty::new(meta, types::builtin().unwrap())
            .unwrap()
            .legal_namespaces(NamespaceConstraint::new(["java.util"]));

        let value = prop.value_from("java.util.List java.util.Date[]").unwrap();
        assert_eq!(value.as_slice().len(), 2);
        assert!(prop.error_for(&value).is_none());

        let value = prop.value_from("java.util.List String").unwrap();
        let message = prop.error_for(&value).unwrap();
        assert!(message.contains("java.lang.String"));
    }
}
