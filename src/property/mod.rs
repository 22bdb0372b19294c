//! Typed, serializable rule properties.
//!
//! Every property kind implements `PropertyDescriptor`: it owns immutable
//! metadata and a default, parses its value from text, serializes it back, and
//! validates parsed values. Parsing and validation are separate steps; a value
//! can parse and still be rejected by `error_for`.
//!
//! Kinds:
//! - `NumericProperty<i64>` / `NumericProperty<f64>`: bounded numbers
//! - `BooleanProperty`, `StringProperty`
//! - `MethodProperty`: `Type#method(argType,...)` references
//! - `TypeProperty`: type references such as `String` or `int[]`
//!
//! `AnyDescriptor` and `AnyValue` wrap the kinds in a tagged union so a rule
//! can hold a heterogeneous `PropertySet`.

use std::fmt;

use crate::error::{ConfigurationError, ParseError, PropertyError, ValidationError};

mod method;
mod namespace;
mod primitive;
mod set;
mod type_ref;

pub use method::{
    format_method, parse_method, MethodProperty, MethodSignature, CLASS_METHOD_DELIMITER,
    METHOD_ARG_DELIMITER, METHOD_GROUP_DELIMITERS,
};
pub use namespace::NamespaceConstraint;
pub use primitive::{BooleanProperty, Numeric, NumericProperty, StringProperty};
pub use set::{AnyDescriptor, AnyValue, PropertySet};
pub use type_ref::TypeProperty;

/// Delimiter used by multi-valued properties unless configured otherwise.
pub const DEFAULT_DELIMITER: char = ' ';

/// Type tag identifying a descriptor's value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Integer,
    Float,
    Boolean,
    String,
    Method,
    Type,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Integer => "integer",
            PropertyType::Float => "float",
            PropertyType::Boolean => "boolean",
            PropertyType::String => "string",
            PropertyType::Method => "method",
            PropertyType::Type => "type",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable descriptor metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMeta {
    name: String,
    description: String,
    ui_order: f32,
    multi_value: bool,
    delimiter: char,
}

impl PropertyMeta {
    /// Metadata for a single-valued property.
    pub fn new(name: impl Into<String>, description: impl Into<String>, ui_order: f32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ui_order,
            multi_value: false,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Make the property multi-valued, split on `delimiter`.
    pub fn multi_valued(mut self, delimiter: char) -> Self {
        self.multi_value = true;
        self.delimiter = delimiter;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn ui_order(&self) -> f32 {
        self.ui_order
    }

    pub fn is_multi_value(&self) -> bool {
        self.multi_value
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Reject a delimiter that can occur inside a single value.
    pub(crate) fn check_delimiter(&self, reserved: &[char]) -> Result<(), ConfigurationError> {
        if !self.multi_value {
            return Ok(());
        }
        if self.delimiter.is_alphanumeric() || reserved.contains(&self.delimiter) {
            return Err(ConfigurationError::DelimiterConflict {
                property: self.name.clone(),
                delimiter: self.delimiter,
            });
        }
        Ok(())
    }
}

/// A property value: unset, one item, or an ordered list of items.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue<T> {
    Absent,
    Single(T),
    Multi(Vec<T>),
}

impl<T> PropertyValue<T> {
    /// All items in order.
    pub fn as_slice(&self) -> &[T] {
        match self {
            PropertyValue::Absent => &[],
            PropertyValue::Single(item) => std::slice::from_ref(item),
            PropertyValue::Multi(items) => items,
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, PropertyValue::Absent)
    }
}

impl<T> Default for PropertyValue<T> {
    fn default() -> Self {
        PropertyValue::Absent
    }
}

/// Capability contract shared by every property kind.
pub trait PropertyDescriptor: Send + Sync {
    type Item: Clone + PartialEq + fmt::Debug + Send + Sync;

    fn meta(&self) -> &PropertyMeta;

    fn property_type(&self) -> PropertyType;

    fn default_value(&self) -> &PropertyValue<Self::Item>;

    /// Parse one item. Multi-valued text has already been split.
    fn item_from(&self, text: &str) -> Result<Self::Item, PropertyError>;

    /// Serialize one item so that `item_from` reproduces it.
    fn item_as_string(&self, item: &Self::Item) -> String;

    /// Validate one parsed item.
    fn item_error(&self, _item: &Self::Item) -> Option<ValidationError> {
        None
    }

    fn name(&self) -> &str {
        self.meta().name()
    }

    /// Parse a whole value. Blank single-valued text is `Absent`; multi-valued
    /// text is split on the delimiter and empty pieces are skipped.
    fn value_from(&self, text: &str) -> Result<PropertyValue<Self::Item>, PropertyError> {
        let meta = self.meta();
        if !meta.is_multi_value() {
            if text.trim().is_empty() {
                return Ok(PropertyValue::Absent);
            }
            return self.item_from(text).map(PropertyValue::Single);
        }

        text.split(meta.delimiter())
            .filter(|piece| !piece.trim().is_empty())
            .map(|piece| self.item_from(piece))
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::Multi)
    }

    /// Parse a value given as separate items, each taken whole. A
    /// single-valued property accepts at most one item.
    fn value_from_items(&self, items: &[String]) -> Result<PropertyValue<Self::Item>, PropertyError> {
        if !self.meta().is_multi_value() {
            return match items {
                [] => Ok(PropertyValue::Absent),
                [item] => self.value_from(item),
                _ => Err(ParseError::invalid_format(&items.join(", "), "expected a single value").into()),
            };
        }

        items
            .iter()
            .filter(|item| !item.trim().is_empty())
            .map(|item| self.item_from(item))
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::Multi)
    }

    /// Serialize a whole value; `Absent` becomes the empty string.
    fn as_string(&self, value: &PropertyValue<Self::Item>) -> String {
        let delimiter = self.meta().delimiter().to_string();
        value
            .as_slice()
            .iter()
            .map(|item| self.item_as_string(item))
            .collect::<Vec<_>>()
            .join(&delimiter)
    }

    /// First validation problem of any item, as a readable message.
    fn error_for(&self, value: &PropertyValue<Self::Item>) -> Option<String> {
        value
            .as_slice()
            .iter()
            .find_map(|item| self.item_error(item))
            .map(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_delimiter_checks() {
        let single = PropertyMeta::new("p", "d", 1.0);
        assert!(single.check_delimiter(&['#']).is_ok());

        let multi = PropertyMeta::new("p", "d", 1.0).multi_valued('#');
        assert_eq!(
            multi.check_delimiter(&['#']),
            Err(ConfigurationError::DelimiterConflict {
                property: "p".to_string(),
                delimiter: '#',
            })
        );
        let alpha = PropertyMeta::new("p", "d", 1.0).multi_valued('x');
        assert!(alpha.check_delimiter(&[]).is_err());
        let bar = PropertyMeta::new("p", "d", 1.0).multi_valued('|');
        assert!(bar.check_delimiter(&['#']).is_ok());
    }

    #[test]
    fn test_value_slices() {
        let absent: PropertyValue<i64> = PropertyValue::Absent;
        assert!(absent.as_slice().is_empty());
        assert_eq!(PropertyValue::Single(3).as_slice(), &[3]);
        assert_eq!(PropertyValue::Multi(vec![1, 2]).first(), Some(&1));
    }
}
