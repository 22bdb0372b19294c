//! Numeric, boolean and string properties.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use crate::error::{ConfigurationError, ParseError, PropertyError, ValidationError};

use super::{PropertyDescriptor, PropertyMeta, PropertyType, PropertyValue};

/// Characters that occur in numeric literals.
const NUMERIC_RESERVED: &[char] = &['-', '+', '.'];

/// Number types usable in a `NumericProperty`.
pub trait Numeric:
    Copy + PartialOrd + FromStr + Display + Debug + Send + Sync + 'static
{
    const TYPE: PropertyType;
    const EXPECTED: &'static str;

    /// Whether a parsed number is acceptable at all (e.g. finite).
    fn is_valid(&self) -> bool {
        true
    }
}

impl Numeric for i64 {
    const TYPE: PropertyType = PropertyType::Integer;
    const EXPECTED: &'static str = "integer";
}

impl Numeric for f64 {
    const TYPE: PropertyType = PropertyType::Float;
    const EXPECTED: &'static str = "number";

    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

/// A number with inclusive bounds.
#[derive(Debug, Clone)]
pub struct NumericProperty<T: Numeric> {
    meta: PropertyMeta,
    default: PropertyValue<T>,
    min: T,
    max: T,
}

impl<T: Numeric> NumericProperty<T> {
    pub fn new(meta: PropertyMeta, min: T, max: T) -> Result<Self, ConfigurationError> {
        meta.check_delimiter(NUMERIC_RESERVED)?;
        Ok(Self {
            meta,
            default: PropertyValue::Absent,
            min,
            max,
        })
    }

    pub fn with_default(mut self, default: PropertyValue<T>) -> Self {
        self.default = default;
        self
    }
}

impl<T: Numeric> PropertyDescriptor for NumericProperty<T> {
    type Item = T;

    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn property_type(&self) -> PropertyType {
        T::TYPE
    }

    fn default_value(&self) -> &PropertyValue<T> {
        &self.default
    }

    fn item_from(&self, text: &str) -> Result<T, PropertyError> {
        let trimmed = text.trim();
        match trimmed.parse::<T>() {
            Ok(value) if value.is_valid() => Ok(value),
            _ => Err(ParseError::InvalidValue {
                input: trimmed.to_string(),
                expected: T::EXPECTED,
            }
            .into()),
        }
    }

    fn item_as_string(&self, item: &T) -> String {
        item.to_string()
    }

    fn item_error(&self, item: &T) -> Option<ValidationError> {
        if *item < self.min || *item > self.max {
            return Some(ValidationError::OutOfRange {
                value: item.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            });
        }
        None
    }
}

/// `true` or `false`, case-insensitive on input.
#[derive(Debug, Clone)]
pub struct BooleanProperty {
    meta: PropertyMeta,
    default: PropertyValue<bool>,
}

impl BooleanProperty {
    pub fn new(meta: PropertyMeta) -> Result<Self, ConfigurationError> {
        meta.check_delimiter(&[])?;
        Ok(Self {
            meta,
            default: PropertyValue::Absent,
        })
    }

    pub fn with_default(mut self, default: PropertyValue<bool>) -> Self {
        self.default = default;
        self
    }
}

impl PropertyDescriptor for BooleanProperty {
    type Item = bool;

    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn property_type(&self) -> PropertyType {
        PropertyType::Boolean
    }

    fn default_value(&self) -> &PropertyValue<bool> {
        &self.default
    }

    fn item_from(&self, text: &str) -> Result<bool, PropertyError> {
        let trimmed = text.trim();
        match trimmed.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ParseError::InvalidValue {
                input: trimmed.to_string(),
                expected: "boolean",
            }
            .into()),
        }
    }

    fn item_as_string(&self, item: &bool) -> String {
        item.to_string()
    }
}

/// Free text. Multi-valued strings may not contain their delimiter.
#[derive(Debug, Clone)]
pub struct StringProperty {
    meta: PropertyMeta,
    default: PropertyValue<String>,
}

impl StringProperty {
    pub fn new(meta: PropertyMeta) -> Result<Self, ConfigurationError> {
        meta.check_delimiter(&[])?;
        Ok(Self {
            meta,
            default: PropertyValue::Absent,
        })
    }

    pub fn with_default(mut self, default: PropertyValue<String>) -> Self {
        self.default = default;
        self
    }
}

impl PropertyDescriptor for StringProperty {
    type Item = String;

    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn property_type(&self) -> PropertyType {
        PropertyType::String
    }

    fn default_value(&self) -> &PropertyValue<String> {
        &self.default
    }

    fn item_from(&self, text: &str) -> Result<String, PropertyError> {
        Ok(text.to_string())
    }

    fn item_as_string(&self, item: &String) -> String {
        item.clone()
    }

    fn item_error(&self, item: &String) -> Option<ValidationError> {
        let delimiter = self.meta.delimiter();
        if self.meta.is_multi_value() && item.contains(delimiter) {
            return Some(ValidationError::ContainsDelimiter {
                value: item.clone(),
                delimiter,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_parse_and_bounds() {
        let prop = NumericProperty::new(PropertyMeta::new("minimum", "", 1.0), 0.0, f64::MAX)
            .unwrap()
            .with_default(PropertyValue::Single(100.0));
        assert_eq!(prop.property_type(), PropertyType::Float);
        assert_eq!(prop.value_from(" 12.5 ").unwrap(), PropertyValue::Single(12.5));
        assert_eq!(prop.as_string(prop.default_value()), "100");
        assert_eq!(prop.value_from("100").unwrap(), *prop.default_value());

        let negative = prop.value_from("-1").unwrap();
        assert!(prop.error_for(&negative).unwrap().contains("outside the range"));
        assert!(prop.value_from("NaN").is_err());
        assert!(prop.value_from("ten").is_err());
    }

    #[test]
    fn test_integer_multi_value() {
        let meta = PropertyMeta::new("sizes", "", 2.0).multi_valued('|');
        let prop = NumericProperty::<i64>::new(meta, 1, 10).unwrap();
        let value = prop.value_from("1|5||10").unwrap();
        assert_eq!(value, PropertyValue::Multi(vec![1, 5, 10]));
        assert_eq!(prop.as_string(&value), "1|5|10");
        assert!(prop.error_for(&value).is_none());
        assert!(prop.error_for(&PropertyValue::Multi(vec![3, 11])).is_some());

        let bad = PropertyMeta::new("sizes", "", 2.0).multi_valued('-');
        assert!(NumericProperty::<i64>::new(bad, 1, 10).is_err());
    }

    #[test]
    fn test_boolean_parse() {
        let prop = BooleanProperty::new(PropertyMeta::new("strict", "", 3.0)).unwrap();
        assert_eq!(prop.value_from("TRUE").unwrap(), PropertyValue::Single(true));
        assert_eq!(prop.value_from("false").unwrap(), PropertyValue::Single(false));
        assert!(matches!(
            prop.value_from("yes"),
            Err(PropertyError::Parse(ParseError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_string_delimiter_validation() {
        let meta = PropertyMeta::new("tags", "", 4.0).multi_valued(',');
        let prop = StringProperty::new(meta).unwrap();
        let value = prop.value_from("a,b c").unwrap();
        assert_eq!(
            value,
            PropertyValue::Multi(vec!["a".to_string(), "b c".to_string()])
        );
        assert!(prop.error_for(&value).is_none());
        let bad = PropertyValue::Multi(vec!["x,y".to_string()]);
        assert!(prop.error_for(&bad).is_some());
    }
}
