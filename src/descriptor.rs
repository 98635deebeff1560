//! Structured descriptors: schema-typed bags of named attribute values.
//!
//! A [`StructDescriptor`] is immutable once constructed and is associated
//! with at most one retrievable. Three lifecycles exist:
//!
//! - **prototype** — schema-definition time; deterministic id derived from
//!   the field name, no retrievable attached, all values set to their type's
//!   default. Usable as a schema cache key.
//! - **empty** — query time, when extraction is impossible; deterministic id
//!   under a separate namespace prefix so it never collides with a prototype.
//! - **populated** — ingest time; fresh random id, retrievable id attached.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{KaleidoError, Result};
use crate::retrievable::RetrievableId;
use crate::types::{Type, Value};

/// Identifier of a descriptor.
pub type DescriptorId = Uuid;

/// Fixed namespace for name-derived descriptor ids. Part of the id contract:
/// changing it changes every prototype/empty id ever derived.
const DESCRIPTOR_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b61_6c65_6964_6f00_8000_4b4c_4454_0001);

/// Derive a deterministic descriptor id from a namespace prefix and a name.
fn name_derived_id(prefix: &str, name: &str) -> DescriptorId {
    Uuid::new_v5(
        &DESCRIPTOR_ID_NAMESPACE,
        format!("{prefix}{name}").as_bytes(),
    )
}

/// Describes one slot of a descriptor's layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The attribute's value kind.
    pub kind: Type,
    /// Whether the attribute may be absent in populated instances.
    pub nullable: bool,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new<S: Into<String>>(name: S, kind: Type, nullable: bool) -> Self {
        Attribute {
            name: name.into(),
            kind,
            nullable,
        }
    }
}

/// An immutable, schema-typed bag of named attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDescriptor {
    id: DescriptorId,
    retrievable_id: Option<RetrievableId>,
    layout: Vec<Attribute>,
    values: HashMap<String, Option<Value>>,
    /// Non-owning back-reference to the schema field, by name.
    field: Option<String>,
}

impl StructDescriptor {
    /// Create a prototype descriptor for a field.
    ///
    /// The id is deterministic for a given field name; every value is the
    /// default of its attribute's type.
    pub fn prototype(field_name: &str, layout: Vec<Attribute>, field: Option<String>) -> Self {
        StructDescriptor {
            id: name_derived_id("prototype-", field_name),
            retrievable_id: None,
            values: default_values(&layout),
            layout,
            field,
        }
    }

    /// Create an empty descriptor for a field, used when extraction yields
    /// no signal. Deterministic id, distinct from the prototype's.
    pub fn empty(field_name: &str, layout: Vec<Attribute>, field: Option<String>) -> Self {
        StructDescriptor {
            id: name_derived_id("empty-", field_name),
            retrievable_id: None,
            values: default_values(&layout),
            layout,
            field,
        }
    }

    /// Create a populated descriptor with a fresh id.
    ///
    /// The retrievable id is present when the descriptor is created at
    /// ingest time; query-time analysis produces populated descriptors that
    /// are not (yet) attached to any retrievable.
    ///
    /// Fails with [`KaleidoError::InvalidInput`] if a values key is not part
    /// of the layout, or a non-nullable attribute has no present value.
    pub fn populated(
        retrievable_id: Option<RetrievableId>,
        layout: Vec<Attribute>,
        values: HashMap<String, Option<Value>>,
        field: Option<String>,
    ) -> Result<Self> {
        for key in values.keys() {
            if !layout.iter().any(|a| a.name == *key) {
                return Err(KaleidoError::invalid_input(format!(
                    "value '{key}' does not appear in the descriptor layout"
                )));
            }
        }
        for attribute in &layout {
            if !attribute.nullable && !matches!(values.get(&attribute.name), Some(Some(_))) {
                return Err(KaleidoError::invalid_input(format!(
                    "non-nullable attribute '{}' has no value",
                    attribute.name
                )));
            }
        }
        Ok(StructDescriptor {
            id: Uuid::new_v4(),
            retrievable_id,
            layout,
            values,
            field,
        })
    }

    /// The descriptor id.
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    /// The retrievable this descriptor is attached to, if any.
    pub fn retrievable_id(&self) -> Option<RetrievableId> {
        self.retrievable_id
    }

    /// The ordered attribute layout.
    pub fn layout(&self) -> &[Attribute] {
        &self.layout
    }

    /// The attribute values.
    pub fn values(&self) -> &HashMap<String, Option<Value>> {
        &self.values
    }

    /// Look up a present attribute value.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(|v| v.as_ref())
    }

    /// The back-referenced field name, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

fn default_values(layout: &[Attribute]) -> HashMap<String, Option<Value>> {
    layout
        .iter()
        .map(|a| (a.name.clone(), Some(a.kind.default_value())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geography_layout(name: &str) -> Vec<Attribute> {
        vec![Attribute::new(name, Type::Geography, false)]
    }

    #[test]
    fn test_prototype_id_is_deterministic() {
        let a = StructDescriptor::prototype("location", geography_layout("location"), None);
        let b = StructDescriptor::prototype("location", geography_layout("location"), None);
        assert_eq!(a.id(), b.id());
        assert!(a.retrievable_id().is_none());
        assert_eq!(a.value("location"), Some(&Value::Geography("POINT(0 0)".into())));
    }

    #[test]
    fn test_prototype_and_empty_ids_never_collide() {
        let prototype = StructDescriptor::prototype("location", geography_layout("location"), None);
        let empty = StructDescriptor::empty("location", geography_layout("location"), None);
        assert_ne!(prototype.id(), empty.id());
    }

    #[test]
    fn test_prototype_ids_differ_per_field_name() {
        let a = StructDescriptor::prototype("location", geography_layout("location"), None);
        let b = StructDescriptor::prototype("position", geography_layout("position"), None);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_populated_requires_non_nullable_values() {
        let layout = geography_layout("location");
        let err = StructDescriptor::populated(
            Some(Uuid::new_v4()),
            layout.clone(),
            HashMap::from([("location".to_string(), None)]),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("non-nullable"));

        let values = HashMap::from([(
            "location".to_string(),
            Some(Value::Geography("POINT(8.55 47.36)".to_string())),
        )]);
        let descriptor = StructDescriptor::populated(
            Some(Uuid::new_v4()),
            layout,
            values,
            Some("location".into()),
        )
        .unwrap();
        assert!(descriptor.retrievable_id().is_some());
        assert_eq!(descriptor.field(), Some("location"));
    }

    #[test]
    fn test_populated_rejects_values_outside_layout() {
        let values = HashMap::from([("rogue".to_string(), Some(Value::Int(1)))]);
        let err = StructDescriptor::populated(
            Some(Uuid::new_v4()),
            geography_layout("location"),
            values,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not appear in the descriptor layout"));
    }

    #[test]
    fn test_populated_ids_are_fresh() {
        let values = HashMap::from([(
            "location".to_string(),
            Some(Value::Geography("POINT(0 0)".to_string())),
        )]);
        let a = StructDescriptor::populated(
            Some(Uuid::new_v4()),
            geography_layout("location"),
            values.clone(),
            None,
        )
        .unwrap();
        let b = StructDescriptor::populated(None, geography_layout("location"), values, None)
            .unwrap();
        assert_ne!(a.id(), b.id());
        assert!(b.retrievable_id().is_none());
    }
}
