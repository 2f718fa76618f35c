//! Normalize/denormalize use-case service.

use crate::codec::json::{self, CodecError};
use crate::error::{GraphError, GraphResult};
use crate::model::entity::DenormalizedValue;
use crate::schema::SchemaLookup;
use crate::store::EntityStore;
use crate::traversal::{self, NormalizeResult};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error for JSON-in/JSON-out service calls.
#[derive(Debug)]
pub enum ServiceError {
    Graph(GraphError),
    Codec(CodecError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graph(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<GraphError> for ServiceError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

impl From<CodecError> for ServiceError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(CodecError::Json(value))
    }
}

/// Graph normalization service over a schema lookup.
///
/// The service holds no traversal state, so one instance can serve
/// concurrent callers when `S` is `Sync`.
pub struct GraphService<S: SchemaLookup> {
    schema: S,
}

impl<S: SchemaLookup> GraphService<S> {
    pub fn new(schema: S) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Normalizes one embedded graph rooted at `value`.
    pub fn normalize(
        &self,
        value: &DenormalizedValue,
        entity_type: &str,
    ) -> GraphResult<NormalizeResult> {
        match traversal::normalize(&self.schema, value, entity_type) {
            Ok(result) => {
                debug!(
                    "event=normalize module=service status=ok root_type={} root_id={} entities={}",
                    entity_type,
                    result.root_id,
                    result.entities.len()
                );
                Ok(result)
            }
            Err(err) => {
                warn!(
                    "event=normalize module=service status=error root_type={} error_code={}",
                    entity_type,
                    err.code()
                );
                Err(err)
            }
        }
    }

    /// Rebuilds the embedded graph rooted at `(entity_type, root_id)`.
    pub fn denormalize(
        &self,
        root_id: &str,
        entity_type: &str,
        store: &EntityStore,
    ) -> GraphResult<DenormalizedValue> {
        let outcome = traversal::denormalize(&self.schema, root_id, entity_type, store);
        match &outcome {
            Ok(_) => debug!(
                "event=denormalize module=service status=ok root_type={} root_id={}",
                entity_type, root_id
            ),
            Err(err) => warn!(
                "event=denormalize module=service status=error root_type={} root_id={} error_code={}",
                entity_type,
                root_id,
                err.code()
            ),
        }
        outcome
    }

    /// Decodes a JSON graph, normalizes it, and returns the pretty-printed
    /// `{"result": ..., "entities": ...}` document.
    pub fn normalize_json(&self, input: &str, entity_type: &str) -> ServiceResult<String> {
        let value = json::decode_denormalized_str(input, entity_type, &self.schema)?;
        let result = self.normalize(&value, entity_type)?;
        Ok(serde_json::to_string_pretty(&json::encode_result(&result))?)
    }

    /// Decodes a JSON store and returns the pretty-printed embedded graph
    /// rooted at `(entity_type, root_id)`.
    pub fn denormalize_json(
        &self,
        root_id: &str,
        entity_type: &str,
        store_json: &str,
    ) -> ServiceResult<String> {
        let store = json::decode_store_str(store_json, &self.schema)?;
        let value = self.denormalize(root_id, entity_type, &store)?;
        Ok(serde_json::to_string_pretty(&json::encode_denormalized(
            &value,
        ))?)
    }
}
