//! Schema registry: which fields of an entity type reference other entities.
//!
//! # Responsibility
//! - Hold per-type reference fields with target type and cardinality.
//! - Load registries from code (builder) or JSON (`SchemaDefinition`).
//!
//! # Invariants
//! - A built registry is immutable and closed: every target type is registered.
//! - Field order is registration order; traversals follow it.

mod definition;
mod registry;

pub use definition::{FieldDefinition, SchemaDefinition};
pub use registry::{
    Cardinality, ReferenceField, SchemaError, SchemaLookup, SchemaRegistry,
    SchemaRegistryBuilder, ID_FIELD,
};
