//! JSON encode/decode for denormalized values, normalized stores and results.

use crate::error::GraphError;
use crate::model::entity::{
    Attributes, DenormalizedValue, Embedded, EntityType, NormalizedValue, Reference,
};
use crate::schema::{Cardinality, SchemaLookup, ID_FIELD};
use crate::store::EntityStore;
use crate::traversal::NormalizeResult;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// JSON mapping errors.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    /// Schema lookup failed while decoding.
    Graph(GraphError),
    /// A record (or single reference) was not a JSON object.
    ExpectedObject {
        entity_type: EntityType,
        field: Option<String>,
    },
    /// A collection reference was not a JSON array.
    ExpectedArray {
        entity_type: EntityType,
        field: String,
    },
    /// `id` was present but not a string.
    InvalidId { entity_type: EntityType },
    /// A stored record's `id` disagrees with its store key.
    IdMismatch {
        entity_type: EntityType,
        key: String,
        id: String,
    },
    /// A normalized reference held something other than id strings.
    InvalidReferenceId {
        entity_type: EntityType,
        field: String,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "{err}"),
            Self::Graph(err) => write!(f, "{err}"),
            Self::ExpectedObject {
                entity_type,
                field: None,
            } => write!(f, "`{entity_type}` record must be a JSON object"),
            Self::ExpectedObject {
                entity_type,
                field: Some(field),
            } => write!(f, "`{entity_type}.{field}` must be a JSON object"),
            Self::ExpectedArray { entity_type, field } => {
                write!(f, "`{entity_type}.{field}` must be a JSON array")
            }
            Self::InvalidId { entity_type } => {
                write!(f, "`{entity_type}.{ID_FIELD}` must be a string")
            }
            Self::IdMismatch {
                entity_type,
                key,
                id,
            } => write!(
                f,
                "`{entity_type}` record stored under `{key}` carries id `{id}`"
            ),
            Self::InvalidReferenceId { entity_type, field } => {
                write!(f, "`{entity_type}.{field}` must hold id strings")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Graph(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<GraphError> for CodecError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

/// Decodes an embedded record of `entity_type`.
///
/// Declared reference fields become nested records; `null` in a reference
/// field means "not loaded" and decodes as absent. Everything else except
/// `id` is kept as a scalar attribute.
pub fn decode_denormalized<S>(
    json: &Value,
    entity_type: &str,
    schema: &S,
) -> CodecResult<DenormalizedValue>
where
    S: SchemaLookup + ?Sized,
{
    let object = json.as_object().ok_or_else(|| CodecError::ExpectedObject {
        entity_type: entity_type.to_string(),
        field: None,
    })?;
    let fields = schema.reference_fields(entity_type)?;

    let mut value = DenormalizedValue::default();
    for (key, item) in object {
        if key == ID_FIELD {
            value.id = decode_id(item, entity_type)?;
            continue;
        }
        let Some(field) = fields.iter().find(|field| &field.name == key) else {
            value.attributes.insert(key.clone(), item.clone());
            continue;
        };
        let embedded = match (field.cardinality, item) {
            (_, Value::Null) => continue,
            (Cardinality::Single, Value::Object(_)) => Embedded::One(Box::new(
                decode_denormalized(item, &field.target, schema)?,
            )),
            (Cardinality::Single, _) => {
                return Err(CodecError::ExpectedObject {
                    entity_type: entity_type.to_string(),
                    field: Some(key.clone()),
                })
            }
            (Cardinality::Collection, Value::Array(items)) => Embedded::Many(
                items
                    .iter()
                    .map(|nested| decode_denormalized(nested, &field.target, schema))
                    .collect::<CodecResult<Vec<_>>>()?,
            ),
            (Cardinality::Collection, _) => {
                return Err(CodecError::ExpectedArray {
                    entity_type: entity_type.to_string(),
                    field: key.clone(),
                })
            }
        };
        value.references.insert(key.clone(), embedded);
    }
    Ok(value)
}

/// Parses and decodes an embedded record from JSON text.
pub fn decode_denormalized_str<S>(
    input: &str,
    entity_type: &str,
    schema: &S,
) -> CodecResult<DenormalizedValue>
where
    S: SchemaLookup + ?Sized,
{
    let json: Value = serde_json::from_str(input)?;
    decode_denormalized(&json, entity_type, schema)
}

/// Encodes an embedded record, nesting related records inline.
pub fn encode_denormalized(value: &DenormalizedValue) -> Value {
    let mut object = encode_attributes(&value.attributes);
    if let Some(id) = &value.id {
        object.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    }
    for (field, embedded) in &value.references {
        let encoded = match embedded {
            Embedded::One(nested) => encode_denormalized(nested),
            Embedded::Many(nested) => Value::Array(nested.iter().map(encode_denormalized).collect()),
        };
        object.insert(field.clone(), encoded);
    }
    Value::Object(object)
}

/// Encodes one normalized record; references become id strings or arrays.
pub fn encode_normalized(value: &NormalizedValue) -> Value {
    let mut object = encode_attributes(&value.attributes);
    object.insert(ID_FIELD.to_string(), Value::String(value.id.clone()));
    for (field, reference) in &value.references {
        object.insert(field.clone(), encode_reference(reference));
    }
    Value::Object(object)
}

/// Encodes a store as `{type: {id: record}}`, keeping empty tables.
pub fn encode_store(store: &EntityStore) -> Value {
    let mut object = Map::new();
    for entity_type in store.entity_types() {
        let mut table = Map::new();
        for (id, value) in store.table(entity_type).into_iter().flatten() {
            table.insert(id.clone(), encode_normalized(value));
        }
        object.insert(entity_type.to_string(), Value::Object(table));
    }
    Value::Object(object)
}

/// Decodes a `{type: {id: record}}` store.
///
/// A record without `id` takes its store key; a record whose `id` differs
/// from its key is rejected.
pub fn decode_store<S>(json: &Value, schema: &S) -> CodecResult<EntityStore>
where
    S: SchemaLookup + ?Sized,
{
    let object = json.as_object().ok_or_else(|| CodecError::ExpectedObject {
        entity_type: "store".to_string(),
        field: None,
    })?;

    let mut store = EntityStore::with_types(object.keys().cloned());
    for (entity_type, table) in object {
        schema.reference_fields(entity_type)?;
        let table = table.as_object().ok_or_else(|| CodecError::ExpectedObject {
            entity_type: entity_type.clone(),
            field: None,
        })?;
        for (key, record) in table {
            let value = decode_normalized(record, key, entity_type, schema)?;
            store.insert(entity_type.clone(), value);
        }
    }
    Ok(store)
}

/// Parses and decodes a store from JSON text.
pub fn decode_store_str<S>(input: &str, schema: &S) -> CodecResult<EntityStore>
where
    S: SchemaLookup + ?Sized,
{
    let json: Value = serde_json::from_str(input)?;
    decode_store(&json, schema)
}

/// Encodes a normalize result as `{"result": <root id>, "entities": <store>}`.
pub fn encode_result(result: &NormalizeResult) -> Value {
    let mut object = Map::new();
    object.insert("result".to_string(), Value::String(result.root_id.clone()));
    object.insert("entities".to_string(), encode_store(&result.entities));
    Value::Object(object)
}

fn decode_normalized<S>(
    json: &Value,
    key: &str,
    entity_type: &str,
    schema: &S,
) -> CodecResult<NormalizedValue>
where
    S: SchemaLookup + ?Sized,
{
    let object = json.as_object().ok_or_else(|| CodecError::ExpectedObject {
        entity_type: entity_type.to_string(),
        field: None,
    })?;
    let fields = schema.reference_fields(entity_type)?;

    let mut value = NormalizedValue::new(key);
    for (name, item) in object {
        if name == ID_FIELD {
            match decode_id(item, entity_type)? {
                Some(id) if id != key => {
                    return Err(CodecError::IdMismatch {
                        entity_type: entity_type.to_string(),
                        key: key.to_string(),
                        id,
                    })
                }
                _ => continue,
            }
        }
        let Some(field) = fields.iter().find(|field| &field.name == name) else {
            value.attributes.insert(name.clone(), item.clone());
            continue;
        };
        let invalid = || CodecError::InvalidReferenceId {
            entity_type: entity_type.to_string(),
            field: name.clone(),
        };
        let reference = match (field.cardinality, item) {
            (_, Value::Null) => continue,
            (Cardinality::Single, Value::String(id)) => Reference::One(id.clone()),
            (Cardinality::Collection, Value::Array(ids)) => Reference::Many(
                ids.iter()
                    .map(|id| id.as_str().map(str::to_string).ok_or_else(invalid))
                    .collect::<CodecResult<Vec<_>>>()?,
            ),
            _ => return Err(invalid()),
        };
        value.references.insert(name.clone(), reference);
    }
    Ok(value)
}

fn decode_id(json: &Value, entity_type: &str) -> CodecResult<Option<String>> {
    match json {
        Value::String(id) => Ok(Some(id.clone())),
        Value::Null => Ok(None),
        _ => Err(CodecError::InvalidId {
            entity_type: entity_type.to_string(),
        }),
    }
}

fn encode_attributes(attributes: &Attributes) -> Map<String, Value> {
    attributes
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn encode_reference(reference: &Reference) -> Value {
    match reference {
        Reference::One(id) => Value::String(id.clone()),
        Reference::Many(ids) => Value::Array(ids.iter().cloned().map(Value::String).collect()),
    }
}
