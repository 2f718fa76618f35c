//! Denormalized and normalized entity records.
//!
//! # Responsibility
//! - Model embedded relations (`Embedded`) and by-id relations (`Reference`).
//! - Provide the field-level merge used when one entity is seen twice.
//!
//! # Invariants
//! - An absent reference field is a missing map key, never `null`.
//! - An empty collection stays `Many(vec![])`; it is not the same as absent.
//! - `id` is held outside `attributes` and is never treated as a scalar field.
//!   The walkers reject attributes named `id` or after a reference field.

use crate::schema::Cardinality;
use serde_json::Value;
use std::collections::BTreeMap;

/// Named entity category, e.g. `photo`.
pub type EntityType = String;

/// Opaque entity identifier, unique within one `EntityType`.
pub type EntityId = String;

/// `(type, id)` pair identifying one entity across a whole graph.
pub type EntityKey = (EntityType, EntityId);

/// Scalar fields keyed by field name.
///
/// Values are opaque to the engine and copied unchanged.
pub type Attributes = BTreeMap<String, Value>;

/// Payload of a reference field in a denormalized record.
#[derive(Debug, Clone, PartialEq)]
pub enum Embedded {
    One(Box<DenormalizedValue>),
    Many(Vec<DenormalizedValue>),
}

impl Embedded {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::One(_) => Cardinality::Single,
            Self::Many(_) => Cardinality::Collection,
        }
    }
}

/// Payload of a reference field in a normalized record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    One(EntityId),
    Many(Vec<EntityId>),
}

impl Reference {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::One(_) => Cardinality::Single,
            Self::Many(_) => Cardinality::Collection,
        }
    }

    /// Referenced ids in declaration order.
    pub fn ids(&self) -> std::slice::Iter<'_, EntityId> {
        match self {
            Self::One(id) => std::slice::from_ref(id).iter(),
            Self::Many(ids) => ids.iter(),
        }
    }
}

/// Record with related entities embedded inline.
///
/// `id` is optional so that malformed input can be represented and rejected by
/// the normalizer instead of at construction time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenormalizedValue {
    pub id: Option<EntityId>,
    pub attributes: Attributes,
    pub references: BTreeMap<String, Embedded>,
}

impl DenormalizedValue {
    /// Creates a record carrying only its id.
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Returns the id when present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Embeds one related entity under `field`.
    pub fn with_one(mut self, field: impl Into<String>, nested: DenormalizedValue) -> Self {
        self.references
            .insert(field.into(), Embedded::One(Box::new(nested)));
        self
    }

    /// Embeds an ordered collection under `field`. An empty iterator still
    /// marks the relation as loaded.
    pub fn with_many(
        mut self,
        field: impl Into<String>,
        nested: impl IntoIterator<Item = DenormalizedValue>,
    ) -> Self {
        self.references
            .insert(field.into(), Embedded::Many(nested.into_iter().collect()));
        self
    }
}

/// Record with related entities replaced by id references.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedValue {
    pub id: EntityId,
    pub attributes: Attributes,
    pub references: BTreeMap<String, Reference>,
}

impl NormalizedValue {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
            references: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_reference(mut self, field: impl Into<String>, reference: Reference) -> Self {
        self.references.insert(field.into(), reference);
        self
    }

    pub fn reference(&self, field: &str) -> Option<&Reference> {
        self.references.get(field)
    }

    /// Folds a later sighting of the same entity into this one.
    ///
    /// Field-level last-write-wins: every field present in `later` replaces the
    /// same field here; fields only present here survive.
    pub fn merge_from(&mut self, later: NormalizedValue) {
        self.attributes.extend(later.attributes);
        self.references.extend(later.references);
    }
}

#[cfg(test)]
mod tests {
    use super::{DenormalizedValue, Embedded, NormalizedValue, Reference};
    use crate::schema::Cardinality;
    use serde_json::json;

    #[test]
    fn id_accessor_treats_empty_as_missing() {
        assert_eq!(DenormalizedValue::new("foo").id(), Some("foo"));
        assert_eq!(DenormalizedValue::new("").id(), None);
        assert_eq!(DenormalizedValue::default().id(), None);
    }

    #[test]
    fn with_many_keeps_empty_collection_as_loaded() {
        let user = DenormalizedValue::new("bar").with_many("photos", Vec::new());
        assert_eq!(user.references.get("photos"), Some(&Embedded::Many(vec![])));
    }

    #[test]
    fn reference_ids_cover_both_cardinalities() {
        let one = Reference::One("a".to_string());
        let many = Reference::Many(vec!["b".to_string(), "c".to_string()]);

        assert_eq!(one.ids().cloned().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(many.ids().cloned().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(one.cardinality(), Cardinality::Single);
        assert_eq!(many.cardinality(), Cardinality::Collection);
    }

    #[test]
    fn merge_from_is_field_level_last_write_wins() {
        let mut first = NormalizedValue::new("bar")
            .with_attribute("name", "Ada")
            .with_attribute("age", 36)
            .with_reference("photos", Reference::Many(vec!["p1".to_string()]));
        let later = NormalizedValue::new("bar")
            .with_attribute("name", "Grace")
            .with_reference("avatar", Reference::One("p9".to_string()));

        first.merge_from(later);

        assert_eq!(first.attributes["name"], json!("Grace"));
        assert_eq!(first.attributes["age"], json!(36));
        assert_eq!(
            first.reference("photos"),
            Some(&Reference::Many(vec!["p1".to_string()]))
        );
        assert_eq!(
            first.reference("avatar"),
            Some(&Reference::One("p9".to_string()))
        );
    }
}
