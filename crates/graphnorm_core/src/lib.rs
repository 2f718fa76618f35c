//! Schema-driven entity graph normalization.
//! Flattens embedded entity graphs into a typed, deduplicated store and
//! rebuilds embedded views from that store.

pub mod codec;
pub mod error;
pub mod logging;
pub mod model;
pub mod schema;
pub mod service;
pub mod store;
pub mod traversal;

pub use codec::json::{CodecError, CodecResult};
pub use error::{GraphError, GraphResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::entity::{
    Attributes, DenormalizedValue, Embedded, EntityId, EntityKey, EntityType, NormalizedValue,
    Reference,
};
pub use schema::{
    Cardinality, FieldDefinition, ReferenceField, SchemaDefinition, SchemaError, SchemaLookup,
    SchemaRegistry, SchemaRegistryBuilder,
};
pub use service::graph_service::{GraphService, ServiceError, ServiceResult};
pub use store::{merge, EntityStore, EntityTable};
pub use traversal::{denormalize, normalize, NormalizeResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
