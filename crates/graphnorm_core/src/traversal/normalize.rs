//! Embedded graph -> flat entity store.

use super::visited::VisitSet;
use super::{cardinality_mismatch, ensure_declared, ensure_distinct_attributes};
use crate::error::{GraphError, GraphResult};
use crate::model::entity::{DenormalizedValue, Embedded, EntityId, NormalizedValue, Reference};
use crate::schema::{Cardinality, SchemaLookup};
use crate::store::{merge, EntityStore};

/// Root id plus every entity reachable from the root.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeResult {
    pub root_id: EntityId,
    pub entities: EntityStore,
}

/// Normalizes `value` as an entity of `entity_type`.
///
/// The returned store has a table for every registered type, empty when no
/// entity of that type was reached.
///
/// # Errors
/// - `UnknownType` when `entity_type` or a nested target is not registered.
/// - `MissingId` when any reached record lacks a non-empty id.
/// - `UndeclaredReference` / `CardinalityMismatch` for records that do not
///   fit their schema.
/// - `FieldCollision` when an attribute is named `id` or after a declared
///   reference field.
///
/// Recursion depth follows the nesting depth of `value`; inputs nested tens of
/// thousands of levels deep can exhaust the thread stack.
pub fn normalize<S>(
    schema: &S,
    value: &DenormalizedValue,
    entity_type: &str,
) -> GraphResult<NormalizeResult>
where
    S: SchemaLookup + ?Sized,
{
    // Surface an unknown root type even when the root has no id.
    schema.reference_fields(entity_type)?;

    let mut visiting = VisitSet::new();
    let (root_id, reached) = normalize_entity(schema, value, entity_type, &mut visiting)?;

    let mut entities = EntityStore::with_types(schema.entity_types());
    entities.absorb(reached);
    Ok(NormalizeResult { root_id, entities })
}

fn normalize_entity<S>(
    schema: &S,
    value: &DenormalizedValue,
    entity_type: &str,
    visiting: &mut VisitSet,
) -> GraphResult<(EntityId, EntityStore)>
where
    S: SchemaLookup + ?Sized,
{
    let id = value
        .id()
        .ok_or_else(|| GraphError::MissingId {
            entity_type: entity_type.to_string(),
        })?
        .to_string();

    // An ancestor is already expanding this entity and will contribute it.
    let Some(mut guard) = visiting.enter(entity_type, &id) else {
        return Ok((id, EntityStore::new()));
    };

    let fields = schema.reference_fields(entity_type)?;
    ensure_declared(entity_type, fields, value.references.keys())?;
    ensure_distinct_attributes(entity_type, fields, &value.attributes)?;

    let mut record = NormalizedValue::new(id.clone());
    record.attributes = value.attributes.clone();
    let mut nested = Vec::new();

    for field in fields {
        let Some(embedded) = value.references.get(&field.name) else {
            continue;
        };
        let reference = match (field.cardinality, embedded) {
            (Cardinality::Single, Embedded::One(child)) => {
                let (child_id, store) =
                    normalize_entity(schema, child, &field.target, &mut guard)?;
                nested.push(store);
                Reference::One(child_id)
            }
            (Cardinality::Collection, Embedded::Many(children)) => {
                let mut ids = Vec::with_capacity(children.len());
                for child in children {
                    let (child_id, store) =
                        normalize_entity(schema, child, &field.target, &mut guard)?;
                    ids.push(child_id);
                    nested.push(store);
                }
                Reference::Many(ids)
            }
            _ => return Err(cardinality_mismatch(entity_type, field)),
        };
        record.references.insert(field.name.clone(), reference);
    }

    let own = EntityStore::singleton(entity_type, record);
    Ok((id, merge(std::iter::once(own).chain(nested))))
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use crate::error::GraphError;
    use crate::model::entity::{DenormalizedValue, Reference};
    use crate::schema::{ReferenceField, SchemaRegistry};

    fn schema() -> SchemaRegistry {
        let mut builder = SchemaRegistry::builder();
        builder
            .register_schema("photo", [ReferenceField::single("user", "user")])
            .unwrap()
            .register_schema("user", [ReferenceField::collection("photos", "photo")])
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn self_reference_short_circuits() {
        let mut builder = SchemaRegistry::builder();
        builder
            .register_schema("node", [ReferenceField::single("next", "node")])
            .unwrap();
        let schema = builder.build().unwrap();

        let looped = DenormalizedValue::new("a").with_one("next", DenormalizedValue::new("a"));
        let result = normalize(&schema, &looped, "node").unwrap();

        assert_eq!(result.entities.len(), 1);
        assert_eq!(
            result.entities.get("node", "a").unwrap().reference("next"),
            Some(&Reference::One("a".to_string()))
        );
    }

    #[test]
    fn error_deep_in_collection_aborts_whole_call() {
        let user = DenormalizedValue::new("bar").with_many(
            "photos",
            [DenormalizedValue::new("p1"), DenormalizedValue::default()],
        );

        let err = normalize(&schema(), &user, "user").unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingId {
                entity_type: "photo".to_string()
            }
        );
    }

    #[test]
    fn unknown_root_type_is_reported_before_id() {
        let err = normalize(&schema(), &DenormalizedValue::default(), "album").unwrap_err();
        assert_eq!(err, GraphError::UnknownType("album".to_string()));
    }

    #[test]
    fn wrong_shape_for_declared_cardinality_fails() {
        let photo = DenormalizedValue::new("foo").with_many("user", [DenormalizedValue::new("bar")]);
        let err = normalize(&schema(), &photo, "photo").unwrap_err();
        assert_eq!(err.code(), "cardinality_mismatch");
    }

    #[test]
    fn undeclared_reference_fails() {
        let photo = DenormalizedValue::new("foo").with_one("owner", DenormalizedValue::new("bar"));
        let err = normalize(&schema(), &photo, "photo").unwrap_err();
        assert_eq!(
            err,
            GraphError::UndeclaredReference {
                entity_type: "photo".to_string(),
                field: "owner".to_string(),
            }
        );
    }
}
