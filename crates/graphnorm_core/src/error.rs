//! Traversal error taxonomy.
//!
//! # Invariants
//! - Every variant is deterministic for a given input; none is retryable.
//! - Any variant aborts the whole top-level call; no partial store escapes.

use crate::model::entity::{EntityId, EntityType};
use crate::schema::Cardinality;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while normalizing or denormalizing an entity graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Schema lookup miss.
    UnknownType(EntityType),
    /// A denormalized record has no id, or an empty one.
    MissingId { entity_type: EntityType },
    /// A referenced id has no entry in the entity store.
    DanglingReference {
        entity_type: EntityType,
        id: EntityId,
    },
    /// A record carries a reference field its schema does not declare.
    UndeclaredReference {
        entity_type: EntityType,
        field: String,
    },
    /// A reference payload disagrees with the declared cardinality.
    CardinalityMismatch {
        entity_type: EntityType,
        field: String,
        expected: Cardinality,
    },
    /// A scalar attribute reuses `id` or a declared reference field name.
    FieldCollision {
        entity_type: EntityType,
        field: String,
    },
}

impl GraphError {
    /// Stable snake_case code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownType(_) => "unknown_type",
            Self::MissingId { .. } => "missing_id",
            Self::DanglingReference { .. } => "dangling_reference",
            Self::UndeclaredReference { .. } => "undeclared_reference",
            Self::CardinalityMismatch { .. } => "cardinality_mismatch",
            Self::FieldCollision { .. } => "field_collision",
        }
    }
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType(entity_type) => write!(f, "unknown entity type: `{entity_type}`"),
            Self::MissingId { entity_type } => {
                write!(f, "`{entity_type}` record is missing a non-empty id")
            }
            Self::DanglingReference { entity_type, id } => {
                write!(f, "no `{entity_type}` entity with id `{id}` in store")
            }
            Self::UndeclaredReference { entity_type, field } => write!(
                f,
                "`{entity_type}` has no reference field named `{field}`"
            ),
            Self::CardinalityMismatch {
                entity_type,
                field,
                expected,
            } => write!(
                f,
                "`{entity_type}.{field}` must hold a {expected} reference"
            ),
            Self::FieldCollision { entity_type, field } => write!(
                f,
                "`{entity_type}` attribute `{field}` collides with a reserved or reference field"
            ),
        }
    }
}

impl Error for GraphError {}
