//! Heterogeneous property collections.
//!
//! `AnyDescriptor` is a tagged union over the concrete property kinds and
//! `AnyValue` the matching union over their values. A `PropertySet` holds a
//! rule's descriptors together with the values explicitly configured for it;
//! reads fall back to each descriptor's default.

use std::collections::HashMap;

use crate::error::{ConfigurationError, ConfigureError, PropertyError};
use crate::types::TypeRef;

use super::{
    BooleanProperty, MethodProperty, MethodSignature, NamespaceConstraint, NumericProperty,
    PropertyDescriptor, PropertyMeta, PropertyType, PropertyValue, StringProperty, TypeProperty,
};

/// Any property kind.
#[derive(Debug, Clone)]
pub enum AnyDescriptor {
    Integer(NumericProperty<i64>),
    Float(NumericProperty<f64>),
    Boolean(BooleanProperty),
    Text(StringProperty),
    Method(MethodProperty),
    Type(TypeProperty),
}

/// A value of any property kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyValue {
    Integer(PropertyValue<i64>),
    Float(PropertyValue<f64>),
    Boolean(PropertyValue<bool>),
    Text(PropertyValue<String>),
    Method(PropertyValue<MethodSignature>),
    Type(PropertyValue<TypeRef>),
}

/// Apply `$body` to the concrete descriptor inside an `AnyDescriptor`.
macro_rules! with_descriptor {
    ($any:expr, $d:ident => $body:expr) => {
        match $any {
            AnyDescriptor::Integer($d) => $body,
            AnyDescriptor::Float($d) => $body,
            AnyDescriptor::Boolean($d) => $body,
            AnyDescriptor::Text($d) => $body,
            AnyDescriptor::Method($d) => $body,
            AnyDescriptor::Type($d) => $body,
        }
    };
}

impl AnyDescriptor {
    pub fn meta(&self) -> &PropertyMeta {
        with_descriptor!(self, d => d.meta())
    }

    pub fn name(&self) -> &str {
        self.meta().name()
    }

    pub fn property_type(&self) -> PropertyType {
        with_descriptor!(self, d => d.property_type())
    }

    pub fn default_value(&self) -> AnyValue {
        match self {
            AnyDescriptor::Integer(d) => AnyValue::Integer(d.default_value().clone()),
            AnyDescriptor::Float(d) => AnyValue::Float(d.default_value().clone()),
            AnyDescriptor::Boolean(d) => AnyValue::Boolean(d.default_value().clone()),
            AnyDescriptor::Text(d) => AnyValue::Text(d.default_value().clone()),
            AnyDescriptor::Method(d) => AnyValue::Method(d.default_value().clone()),
            AnyDescriptor::Type(d) => AnyValue::Type(d.default_value().clone()),
        }
    }

    pub fn value_from(&self, text: &str) -> Result<AnyValue, PropertyError> {
        Ok(match self {
            AnyDescriptor::Integer(d) => AnyValue::Integer(d.value_from(text)?),
            AnyDescriptor::Float(d) => AnyValue::Float(d.value_from(text)?),
            AnyDescriptor::Boolean(d) => AnyValue::Boolean(d.value_from(text)?),
            AnyDescriptor::Text(d) => AnyValue::Text(d.value_from(text)?),
            AnyDescriptor::Method(d) => AnyValue::Method(d.value_from(text)?),
            AnyDescriptor::Type(d) => AnyValue::Type(d.value_from(text)?),
        })
    }

    /// Namespaces a reference property is limited to, if any.
    pub fn namespaces(&self) -> Option<&NamespaceConstraint> {
        let namespaces = match self {
            AnyDescriptor::Method(d) => d.namespaces(),
            AnyDescriptor::Type(d) => d.namespaces(),
            _ => return None,
        };
        (!namespaces.is_unconstrained()).then_some(namespaces)
    }

    pub fn value_from_items(&self, items: &[String]) -> Result<AnyValue, PropertyError> {
        Ok(match self {
            AnyDescriptor::Integer(d) => AnyValue::Integer(d.value_from_items(items)?),
            AnyDescriptor::Float(d) => AnyValue::Float(d.value_from_items(items)?),
            AnyDescriptor::Boolean(d) => AnyValue::Boolean(d.value_from_items(items)?),
            AnyDescriptor::Text(d) => AnyValue::Text(d.value_from_items(items)?),
            AnyDescriptor::Method(d) => AnyValue::Method(d.value_from_items(items)?),
            AnyDescriptor::Type(d) => AnyValue::Type(d.value_from_items(items)?),
        })
    }

    /// Serialize `value`. Returns `None` when the value is of another kind.
    pub fn as_string(&self, value: &AnyValue) -> Option<String> {
        match (self, value) {
            (AnyDescriptor::Integer(d), AnyValue::Integer(v)) => Some(d.as_string(v)),
            (AnyDescriptor::Float(d), AnyValue::Float(v)) => Some(d.as_string(v)),
            (AnyDescriptor::Boolean(d), AnyValue::Boolean(v)) => Some(d.as_string(v)),
            (AnyDescriptor::Text(d), AnyValue::Text(v)) => Some(d.as_string(v)),
            (AnyDescriptor::Method(d), AnyValue::Method(v)) => Some(d.as_string(v)),
            (AnyDescriptor::Type(d), AnyValue::Type(v)) => Some(d.as_string(v)),
            _ => None,
        }
    }

    pub fn error_for(&self, value: &AnyValue) -> Option<String> {
        match (self, value) {
            (AnyDescriptor::Integer(d), AnyValue::Integer(v)) => d.error_for(v),
            (AnyDescriptor::Float(d), AnyValue::Float(v)) => d.error_for(v),
            (AnyDescriptor::Boolean(d), AnyValue::Boolean(v)) => d.error_for(v),
            (AnyDescriptor::Text(d), AnyValue::Text(v)) => d.error_for(v),
            (AnyDescriptor::Method(d), AnyValue::Method(v)) => d.error_for(v),
            (AnyDescriptor::Type(d), AnyValue::Type(v)) => d.error_for(v),
            (d, v) => Some(format!(
                "expected a {} value, got a {} value",
                d.property_type(),
                v.property_type()
            )),
        }
    }
}

impl AnyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            AnyValue::Integer(_) => PropertyType::Integer,
            AnyValue::Float(_) => PropertyType::Float,
            AnyValue::Boolean(_) => PropertyType::Boolean,
            AnyValue::Text(_) => PropertyType::String,
            AnyValue::Method(_) => PropertyType::Method,
            AnyValue::Type(_) => PropertyType::Type,
        }
    }

    pub fn is_absent(&self) -> bool {
        match self {
            AnyValue::Integer(v) => v.is_absent(),
            AnyValue::Float(v) => v.is_absent(),
            AnyValue::Boolean(v) => v.is_absent(),
            AnyValue::Text(v) => v.is_absent(),
            AnyValue::Method(v) => v.is_absent(),
            AnyValue::Type(v) => v.is_absent(),
        }
    }
}

macro_rules! impl_from_descriptor {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for AnyDescriptor {
                fn from(descriptor: $ty) -> Self {
                    AnyDescriptor::$variant(descriptor)
                }
            }
        )*
    };
}

impl_from_descriptor!(
    Integer(NumericProperty<i64>),
    Float(NumericProperty<f64>),
    Boolean(BooleanProperty),
    Text(StringProperty),
    Method(MethodProperty),
    Type(TypeProperty),
);

/// A rule's descriptors and the values configured for them.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    owner: String,
    descriptors: Vec<AnyDescriptor>,
    configured: HashMap<String, AnyValue>,
}

impl PropertySet {
    /// An empty set; `owner` names the rule in error messages.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// Add a descriptor. Names must be unique.
    pub fn define(&mut self, descriptor: impl Into<AnyDescriptor>) -> Result<(), ConfigurationError> {
        let descriptor = descriptor.into();
        if self.descriptor(descriptor.name()).is_some() {
            return Err(ConfigurationError::DuplicateProperty(
                descriptor.name().to_string(),
            ));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn descriptor(&self, name: &str) -> Option<&AnyDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    /// Descriptors sorted by display priority, then name.
    pub fn descriptors(&self) -> Vec<&AnyDescriptor> {
        let mut sorted: Vec<&AnyDescriptor> = self.descriptors.iter().collect();
        sorted.sort_by(|a, b| {
            a.meta()
                .ui_order()
                .total_cmp(&b.meta().ui_order())
                .then_with(|| a.name().cmp(b.name()))
        });
        sorted
    }

    /// Parse and validate `text` for property `name`, storing it on success.
    pub fn configure(&mut self, name: &str, text: &str) -> Result<(), ConfigureError> {
        self.store(name, |descriptor| descriptor.value_from(text))
    }

    /// Like `configure`, but the value arrives already split into items.
    /// Items are never split again, so they may contain the delimiter.
    pub fn configure_items(&mut self, name: &str, items: &[String]) -> Result<(), ConfigureError> {
        self.store(name, |descriptor| descriptor.value_from_items(items))
    }

    fn store(
        &mut self,
        name: &str,
        parse: impl FnOnce(&AnyDescriptor) -> Result<AnyValue, PropertyError>,
    ) -> Result<(), ConfigureError> {
        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| ConfigurationError::UnknownProperty {
                rule: self.owner.clone(),
                property: name.to_string(),
            })?;

        let value = parse(descriptor).map_err(|source| ConfigureError::Parse {
            property: name.to_string(),
            source,
        })?;
        if let Some(message) = descriptor.error_for(&value) {
            return Err(ConfigureError::Invalid {
                property: name.to_string(),
                message,
            });
        }

        self.configured.insert(name.to_string(), value);
        Ok(())
    }

    /// Whether `name` was explicitly configured with a non-absent value.
    pub fn is_configured(&self, name: &str) -> bool {
        self.configured.get(name).is_some_and(|v| !v.is_absent())
    }

    /// The configured value, or the descriptor default.
    pub fn value(&self, name: &str) -> Option<AnyValue> {
        if let Some(value) = self.configured.get(name) {
            return Some(value.clone());
        }
        self.descriptor(name).map(AnyDescriptor::default_value)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.value(name)? {
            AnyValue::Float(v) => v.first().copied(),
            AnyValue::Integer(v) => v.first().map(|n| *n as f64),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.value(name)? {
            AnyValue::Integer(v) => v.first().copied(),
            _ => None,
        }
    }

    pub fn methods(&self, name: &str) -> Vec<MethodSignature> {
        match self.value(name) {
            Some(AnyValue::Method(v)) => v.as_slice().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Every descriptor with its current value serialized, in display order.
    pub fn to_strings(&self) -> Vec<(String, String)> {
        self.descriptors()
            .into_iter()
            .map(|d| {
                let text = self
                    .value(d.name())
                    .and_then(|v| d.as_string(&v))
                    .unwrap_or_default();
                (d.name().to_string(), text)
            })
            .collect()
    }
}
