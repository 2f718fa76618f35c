//! Serializable schema definitions.
//!
//! A definition is the configuration-file form of a registry:
//!
//! ```json
//! {
//!   "types": {
//!     "photo": [{ "name": "user", "type": "user", "cardinality": "single" }],
//!     "user": [{ "name": "photos", "type": "photo", "cardinality": "collection" }]
//!   }
//! }
//! ```

use crate::schema::registry::{
    Cardinality, ReferenceField, SchemaError, SchemaLookup, SchemaRegistry,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whole-registry definition keyed by entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    pub types: BTreeMap<String, Vec<FieldDefinition>>,
}

/// One reference field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub target: String,
    pub cardinality: Cardinality,
}

impl From<&FieldDefinition> for ReferenceField {
    fn from(value: &FieldDefinition) -> Self {
        Self {
            name: value.name.clone(),
            target: value.target.clone(),
            cardinality: value.cardinality,
        }
    }
}

impl SchemaRegistry {
    /// Builds a registry from a parsed definition, applying builder validation.
    pub fn from_definition(definition: &SchemaDefinition) -> Result<Self, SchemaError> {
        let mut builder = Self::builder();
        for (entity_type, fields) in &definition.types {
            builder.register_schema(entity_type, fields.iter().map(ReferenceField::from))?;
        }
        builder.build()
    }

    /// Parses a JSON definition document and builds the registry.
    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        let definition: SchemaDefinition = serde_json::from_str(input)?;
        Self::from_definition(&definition)
    }

    /// Exports this registry in definition form.
    pub fn to_definition(&self) -> SchemaDefinition {
        let types = self
            .entity_types()
            .into_iter()
            .map(|entity_type| {
                let fields = self
                    .reference_fields(entity_type)
                    .unwrap_or_default()
                    .iter()
                    .map(|field| FieldDefinition {
                        name: field.name.clone(),
                        target: field.target.clone(),
                        cardinality: field.cardinality,
                    })
                    .collect();
                (entity_type.to_string(), fields)
            })
            .collect();
        SchemaDefinition { types }
    }
}

#[cfg(test)]
mod tests {
    use super::SchemaDefinition;
    use crate::schema::{Cardinality, SchemaError, SchemaLookup, SchemaRegistry};

    const PHOTO_USER: &str = r#"{
        "types": {
            "photo": [{ "name": "user", "type": "user", "cardinality": "single" }],
            "user": [{ "name": "photos", "type": "photo", "cardinality": "collection" }]
        }
    }"#;

    #[test]
    fn loads_registry_from_json() {
        let registry = SchemaRegistry::from_json_str(PHOTO_USER).unwrap();
        let photos = &registry.reference_fields("user").unwrap()[0];
        assert_eq!(photos.name, "photos");
        assert_eq!(photos.target, "photo");
        assert_eq!(photos.cardinality, Cardinality::Collection);
    }

    #[test]
    fn definition_roundtrips_through_registry() {
        let registry = SchemaRegistry::from_json_str(PHOTO_USER).unwrap();
        let expected: SchemaDefinition = serde_json::from_str(PHOTO_USER).unwrap();
        assert_eq!(registry.to_definition(), expected);
    }

    #[test]
    fn rejects_unknown_cardinality_and_keys() {
        let bad_cardinality = r#"{"types": {"a": [{"name": "b", "type": "a", "cardinality": "many"}]}}"#;
        assert!(matches!(
            SchemaRegistry::from_json_str(bad_cardinality),
            Err(SchemaError::Parse(_))
        ));

        let extra_key = r#"{"types": {}, "version": 2}"#;
        assert!(matches!(
            SchemaRegistry::from_json_str(extra_key),
            Err(SchemaError::Parse(_))
        ));
    }

    #[test]
    fn definition_goes_through_builder_validation() {
        let dangling = r#"{"types": {"photo": [{"name": "user", "type": "user", "cardinality": "single"}]}}"#;
        assert!(matches!(
            SchemaRegistry::from_json_str(dangling),
            Err(SchemaError::UnknownTarget { .. })
        ));
    }
}
