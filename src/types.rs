//! Attribute type system for descriptors.
//!
//! This module defines the [`Type`] enumeration describing the kind of a
//! descriptor attribute, and the [`Value`] enum holding a concrete attribute
//! value of that kind.
//!
//! # Supported Types
//!
//! - **Text** - String data
//! - **Boolean** - true/false values
//! - **Int** - 64-bit signed integers
//! - **Double** - 64-bit floating-point numbers
//! - **FloatVector** - dense float vectors (embeddings)
//! - **Geography** - a point geometry in WKT form, `POINT(lon lat)`
//! - **Date** - calendar dates
//! - **DateTime** - local date-times
//!
//! Every [`Type`] exposes a [`Type::default_value`] used to populate
//! prototype and empty descriptors.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The kind of a descriptor attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Text type.
    Text,
    /// Boolean type.
    Boolean,
    /// Integer type (i64).
    Int,
    /// Floating-point type (f64).
    Double,
    /// Dense float vector type.
    FloatVector,
    /// Geography type (WKT point).
    Geography,
    /// Calendar date type.
    Date,
    /// Local date-time type.
    DateTime,
}

impl Type {
    /// The default value for this type, used for prototype and empty descriptors.
    pub fn default_value(&self) -> Value {
        match self {
            Type::Text => Value::Text(String::new()),
            Type::Boolean => Value::Boolean(false),
            Type::Int => Value::Int(0),
            Type::Double => Value::Double(0.0),
            Type::FloatVector => Value::FloatVector(Vec::new()),
            Type::Geography => Value::Geography("POINT(0 0)".to_string()),
            Type::Date => Value::Date(NaiveDate::default()),
            Type::DateTime => Value::DateTime(NaiveDateTime::default()),
        }
    }
}

/// A concrete attribute value.
///
/// Geography values wrap a well-known-text point, e.g. `POINT(8.55 47.36)`.
///
/// # Examples
///
/// ```
/// use kaleido::types::{Type, Value};
///
/// let value = Value::Geography("POINT(8.55 47.36)".to_string());
/// assert_eq!(value.kind(), Type::Geography);
/// assert_eq!(value.as_geography(), Some("POINT(8.55 47.36)"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Text value
    Text(String),
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Double(f64),
    /// Dense float vector value
    FloatVector(Vec<f32>),
    /// Geography value (WKT point)
    Geography(String),
    /// Calendar date value
    Date(NaiveDate),
    /// Local date-time value
    DateTime(NaiveDateTime),
}

impl Value {
    /// The [`Type`] this value belongs to.
    pub fn kind(&self) -> Type {
        match self {
            Value::Text(_) => Type::Text,
            Value::Boolean(_) => Type::Boolean,
            Value::Int(_) => Type::Int,
            Value::Double(_) => Type::Double,
            Value::FloatVector(_) => Type::FloatVector,
            Value::Geography(_) => Type::Geography,
            Value::Date(_) => Type::Date,
            Value::DateTime(_) => Type::DateTime,
        }
    }

    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to boolean if this is a boolean value.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to numeric string representation.
    pub fn as_numeric(&self) -> Option<String> {
        match self {
            Value::Int(i) => Some(i.to_string()),
            Value::Double(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// Get the WKT text if this is a geography value.
    pub fn as_geography(&self) -> Option<&str> {
        match self {
            Value::Geography(wkt) => Some(wkt),
            _ => None,
        }
    }

    /// Get the vector components if this is a float vector value.
    pub fn as_float_vector(&self) -> Option<&[f32]> {
        match self {
            Value::FloatVector(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values_match_kind() {
        for ty in [
            Type::Text,
            Type::Boolean,
            Type::Int,
            Type::Double,
            Type::FloatVector,
            Type::Geography,
            Type::Date,
            Type::DateTime,
        ] {
            assert_eq!(ty.default_value().kind(), ty);
        }
    }

    #[test]
    fn test_geography_default_is_origin_point() {
        let value = Type::Geography.default_value();
        assert_eq!(value.as_geography(), Some("POINT(0 0)"));
    }

    #[test]
    fn test_accessors_reject_other_kinds() {
        let value = Value::Int(42);
        assert_eq!(value.as_text(), None);
        assert_eq!(value.as_geography(), None);
        assert_eq!(value.as_numeric(), Some("42".to_string()));
    }
}
