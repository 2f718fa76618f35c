//! Flat entity store -> embedded graph.

use super::visited::VisitSet;
use super::{cardinality_mismatch, ensure_declared, ensure_distinct_attributes};
use crate::error::{GraphError, GraphResult};
use crate::model::entity::{DenormalizedValue, Embedded, Reference};
use crate::schema::{Cardinality, SchemaLookup};
use crate::store::EntityStore;

/// Rebuilds the embedded view of `(entity_type, id)` from `store`.
///
/// An entity met again below itself is emitted as an id-only record; the
/// embed is truncated there rather than expanded forever.
///
/// # Errors
/// - `UnknownType` when a reached type is not registered.
/// - `DanglingReference` when a reached id has no entry in `store`.
/// - `UndeclaredReference` / `CardinalityMismatch` for records that do not
///   fit their schema.
/// - `FieldCollision` when a stored attribute is named `id` or after a
///   declared reference field.
///
/// Recursion depth follows the reference chain length in `store`; chains tens
/// of thousands of entities long can exhaust the thread stack.
pub fn denormalize<S>(
    schema: &S,
    id: &str,
    entity_type: &str,
    store: &EntityStore,
) -> GraphResult<DenormalizedValue>
where
    S: SchemaLookup + ?Sized,
{
    let mut visiting = VisitSet::new();
    denormalize_entity(schema, id, entity_type, store, &mut visiting)
}

fn denormalize_entity<S>(
    schema: &S,
    id: &str,
    entity_type: &str,
    store: &EntityStore,
    visiting: &mut VisitSet,
) -> GraphResult<DenormalizedValue>
where
    S: SchemaLookup + ?Sized,
{
    let fields = schema.reference_fields(entity_type)?;
    let record = store
        .get(entity_type, id)
        .ok_or_else(|| GraphError::DanglingReference {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        })?;

    let Some(mut guard) = visiting.enter(entity_type, id) else {
        return Ok(DenormalizedValue::new(id));
    };

    ensure_declared(entity_type, fields, record.references.keys())?;
    ensure_distinct_attributes(entity_type, fields, &record.attributes)?;

    let mut value = DenormalizedValue::new(id);
    value.attributes = record.attributes.clone();

    for field in fields {
        let Some(reference) = record.reference(&field.name) else {
            continue;
        };
        let embedded = match (field.cardinality, reference) {
            (Cardinality::Single, Reference::One(child_id)) => Embedded::One(Box::new(
                denormalize_entity(schema, child_id, &field.target, store, &mut guard)?,
            )),
            (Cardinality::Collection, Reference::Many(child_ids)) => Embedded::Many(
                child_ids
                    .iter()
                    .map(|child_id| {
                        denormalize_entity(schema, child_id, &field.target, store, &mut guard)
                    })
                    .collect::<GraphResult<Vec<_>>>()?,
            ),
            _ => return Err(cardinality_mismatch(entity_type, field)),
        };
        value.references.insert(field.name.clone(), embedded);
    }

    Ok(value)
}
