//! Schema management: named, typed fields with per-field configuration.
//!
//! A [`Schema`] is the registry of [`Field`]s an index exposes. Fields are
//! registered once and consumed read-only afterwards; a field name is unique
//! within its schema and stable for the lifetime of the index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{KaleidoError, Result};

/// The content kind a field's analyser consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    /// Textual content.
    Text,
    /// Raster image content.
    Image,
}

/// The descriptor kind a field's analyser produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptorType {
    /// Attribute-map structured descriptors.
    Struct,
    /// Dense float vector descriptors.
    FloatVector,
}

/// A named, typed slot of a schema with per-field configuration.
///
/// The configuration map holds free-form key/value tunables, e.g. a
/// `"limit"` entry capping result counts for retrievers built on this field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// The unique field name.
    name: String,
    /// The content kind consumed by this field's analyser.
    content_kind: ContentType,
    /// The descriptor kind produced by this field's analyser.
    descriptor_kind: DescriptorType,
    /// Per-field key/value options.
    config: HashMap<String, String>,
}

impl Field {
    /// Create a new field.
    pub fn new<S: Into<String>>(
        name: S,
        content_kind: ContentType,
        descriptor_kind: DescriptorType,
    ) -> Self {
        Field {
            name: name.into(),
            content_kind,
            descriptor_kind,
            config: HashMap::new(),
        }
    }

    /// Add a configuration entry.
    pub fn with_config<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The content kind consumed by this field's analyser.
    pub fn content_kind(&self) -> ContentType {
        self.content_kind
    }

    /// The descriptor kind produced by this field's analyser.
    pub fn descriptor_kind(&self) -> DescriptorType {
        self.descriptor_kind
    }

    /// Look up a configuration entry.
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(|s| s.as_str())
    }
}

/// A schema defines the fields available in an index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Map of field names to their definitions
    fields: HashMap<String, Field>,
    /// Ordered list of field names (for consistent ordering)
    field_names: Vec<String>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Schema::default()
    }

    /// Add a field to the schema.
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        let name = field.name().to_string();

        if name.is_empty() {
            return Err(KaleidoError::schema("Field name cannot be empty"));
        }
        if self.fields.contains_key(&name) {
            return Err(KaleidoError::schema(format!(
                "Field '{name}' already exists"
            )));
        }

        self.fields.insert(name.clone(), field);
        self.field_names.push(name);
        Ok(())
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Check whether a field exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field names in registration order.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup_field() {
        let mut schema = Schema::new();
        let field = Field::new("location", ContentType::Image, DescriptorType::Struct)
            .with_config("limit", "50");
        schema.add_field(field).unwrap();

        let field = schema.field("location").unwrap();
        assert_eq!(field.name(), "location");
        assert_eq!(field.config_value("limit"), Some("50"));
        assert_eq!(field.config_value("missing"), None);
        assert_eq!(schema.field_names(), ["location".to_string()]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut schema = Schema::new();
        schema
            .add_field(Field::new("a", ContentType::Text, DescriptorType::Struct))
            .unwrap();
        let err = schema
            .add_field(Field::new("a", ContentType::Text, DescriptorType::Struct))
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let mut schema = Schema::new();
        let err = schema
            .add_field(Field::new("", ContentType::Text, DescriptorType::Struct))
            .unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }
}
