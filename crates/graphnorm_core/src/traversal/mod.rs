//! Schema-driven graph walkers.
//!
//! # Responsibility
//! - `normalize`: embedded graph -> root id + flat entity store.
//! - `denormalize`: root id + flat entity store -> embedded graph.
//!
//! # Invariants
//! - Each top-level call owns a fresh `VisitSet`; walkers share no state.
//! - Revisiting an ancestor short-circuits instead of recursing.
//! - Any error aborts the whole call with no partial result.

mod denormalize;
mod normalize;
mod visited;

pub use denormalize::denormalize;
pub use normalize::{normalize, NormalizeResult};
pub use visited::{VisitGuard, VisitSet};

use crate::error::{GraphError, GraphResult};
use crate::model::entity::Attributes;
use crate::schema::{ReferenceField, ID_FIELD};

/// Rejects record fields that the entity type does not declare.
fn ensure_declared<'a>(
    entity_type: &str,
    declared: &[ReferenceField],
    present: impl IntoIterator<Item = &'a String>,
) -> GraphResult<()> {
    for name in present {
        if !declared.iter().any(|field| &field.name == name) {
            return Err(GraphError::UndeclaredReference {
                entity_type: entity_type.to_string(),
                field: name.clone(),
            });
        }
    }
    Ok(())
}

/// Rejects attributes named `id` or after a declared reference field.
fn ensure_distinct_attributes(
    entity_type: &str,
    declared: &[ReferenceField],
    attributes: &Attributes,
) -> GraphResult<()> {
    let collision = attributes
        .keys()
        .find(|name| *name == ID_FIELD || declared.iter().any(|field| &field.name == *name));
    match collision {
        Some(name) => Err(GraphError::FieldCollision {
            entity_type: entity_type.to_string(),
            field: name.clone(),
        }),
        None => Ok(()),
    }
}

fn cardinality_mismatch(entity_type: &str, field: &ReferenceField) -> GraphError {
    GraphError::CardinalityMismatch {
        entity_type: entity_type.to_string(),
        field: field.name.clone(),
        expected: field.cardinality,
    }
}
