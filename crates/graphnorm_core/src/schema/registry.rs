//! Schema registry contracts and builder.

use crate::error::{GraphError, GraphResult};
use crate::model::entity::EntityType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid schema name regex"));

/// Field name reserved for entity identity.
pub const ID_FIELD: &str = "id";

/// Whether a reference field holds one related entity or an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Single,
    Collection,
}

impl Cardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Collection => "collection",
        }
    }
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared reference field of an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceField {
    pub name: String,
    /// Entity type of the referenced record(s).
    pub target: EntityType,
    pub cardinality: Cardinality,
}

impl ReferenceField {
    pub fn single(name: impl Into<String>, target: impl Into<EntityType>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::Single,
        }
    }

    pub fn collection(name: impl Into<String>, target: impl Into<EntityType>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::Collection,
        }
    }
}

/// Schema registration/validation errors.
#[derive(Debug)]
pub enum SchemaError {
    InvalidTypeName(String),
    DuplicateType(String),
    InvalidFieldName {
        entity_type: EntityType,
        field: String,
    },
    DuplicateField {
        entity_type: EntityType,
        field: String,
    },
    /// `id` cannot be declared as a reference field.
    ReservedField { entity_type: EntityType },
    /// A field targets a type that was never registered.
    UnknownTarget {
        entity_type: EntityType,
        field: String,
        target: EntityType,
    },
    /// JSON schema definition could not be parsed.
    Parse(serde_json::Error),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTypeName(value) => write!(f, "entity type name is invalid: `{value}`"),
            Self::DuplicateType(value) => write!(f, "entity type already registered: `{value}`"),
            Self::InvalidFieldName { entity_type, field } => {
                write!(f, "reference field name is invalid: `{entity_type}.{field}`")
            }
            Self::DuplicateField { entity_type, field } => {
                write!(f, "reference field declared twice: `{entity_type}.{field}`")
            }
            Self::ReservedField { entity_type } => write!(
                f,
                "`{entity_type}.{ID_FIELD}` is reserved and cannot be a reference field"
            ),
            Self::UnknownTarget {
                entity_type,
                field,
                target,
            } => write!(
                f,
                "`{entity_type}.{field}` references unregistered type `{target}`"
            ),
            Self::Parse(err) => write!(f, "invalid schema definition: {err}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Read-only schema access used by the graph walkers.
pub trait SchemaLookup {
    /// Reference fields of `entity_type` in registration order.
    ///
    /// # Errors
    /// - `GraphError::UnknownType` when the type is not registered.
    fn reference_fields(&self, entity_type: &str) -> GraphResult<&[ReferenceField]>;

    /// All registered entity types.
    fn entity_types(&self) -> Vec<&str>;
}

impl<T: SchemaLookup + ?Sized> SchemaLookup for Arc<T> {
    fn reference_fields(&self, entity_type: &str) -> GraphResult<&[ReferenceField]> {
        (**self).reference_fields(entity_type)
    }

    fn entity_types(&self) -> Vec<&str> {
        (**self).entity_types()
    }
}

/// Immutable, closed set of entity schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    types: BTreeMap<EntityType, Vec<ReferenceField>>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }
}

impl SchemaLookup for SchemaRegistry {
    fn reference_fields(&self, entity_type: &str) -> GraphResult<&[ReferenceField]> {
        self.types
            .get(entity_type)
            .map(Vec::as_slice)
            .ok_or_else(|| GraphError::UnknownType(entity_type.to_string()))
    }

    fn entity_types(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }
}

/// Collects schemas before freezing them into a `SchemaRegistry`.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistryBuilder {
    types: BTreeMap<EntityType, Vec<ReferenceField>>,
}

impl SchemaRegistryBuilder {
    /// Registers the reference fields of one entity type.
    ///
    /// Names are trimmed before validation. Types without reference fields are
    /// registered with an empty iterator.
    pub fn register_schema(
        &mut self,
        entity_type: &str,
        fields: impl IntoIterator<Item = ReferenceField>,
    ) -> Result<&mut Self, SchemaError> {
        let entity_type = entity_type.trim().to_string();
        if !NAME_RE.is_match(&entity_type) {
            return Err(SchemaError::InvalidTypeName(entity_type));
        }
        if self.types.contains_key(&entity_type) {
            return Err(SchemaError::DuplicateType(entity_type));
        }

        let mut seen = BTreeSet::new();
        let mut declared = Vec::new();
        for field in fields {
            let name = field.name.trim().to_string();
            if name == ID_FIELD {
                return Err(SchemaError::ReservedField { entity_type });
            }
            if !NAME_RE.is_match(&name) {
                return Err(SchemaError::InvalidFieldName {
                    entity_type,
                    field: name,
                });
            }
            if !seen.insert(name.clone()) {
                return Err(SchemaError::DuplicateField {
                    entity_type,
                    field: name,
                });
            }
            declared.push(ReferenceField {
                name,
                target: field.target.trim().to_string(),
                cardinality: field.cardinality,
            });
        }

        self.types.insert(entity_type, declared);
        Ok(self)
    }

    /// Freezes the registry after checking every target type is registered.
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        for (entity_type, fields) in &self.types {
            for field in fields {
                if !self.types.contains_key(&field.target) {
                    return Err(SchemaError::UnknownTarget {
                        entity_type: entity_type.clone(),
                        field: field.name.clone(),
                        target: field.target.clone(),
                    });
                }
            }
        }
        Ok(SchemaRegistry { types: self.types })
    }
}
