//! Flat entity store keyed by type, then id.
//!
//! # Responsibility
//! - Hold normalized records produced by one traversal.
//! - Report references whose targets are missing.
//!
//! # Invariants
//! - A root normalize store holds every entity reachable from the root.
//! - Stores are plain values; nothing in core keeps a handle after returning one.

mod merge;

pub use merge::merge;

use crate::error::GraphResult;
use crate::model::entity::{EntityId, EntityKey, EntityType, NormalizedValue};
use crate::schema::SchemaLookup;
use std::collections::{BTreeMap, BTreeSet};

/// Records of one entity type keyed by id.
pub type EntityTable = BTreeMap<EntityId, NormalizedValue>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    tables: BTreeMap<EntityType, EntityTable>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with an empty table for each given type.
    pub fn with_types<I, T>(entity_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityType>,
    {
        let tables = entity_types
            .into_iter()
            .map(|entity_type| (entity_type.into(), EntityTable::new()))
            .collect();
        Self { tables }
    }

    /// Creates a store holding exactly one record.
    pub fn singleton(entity_type: impl Into<EntityType>, value: NormalizedValue) -> Self {
        let mut store = Self::new();
        store.insert(entity_type, value);
        store
    }

    /// Inserts or replaces one record; returns the replaced record.
    pub fn insert(
        &mut self,
        entity_type: impl Into<EntityType>,
        value: NormalizedValue,
    ) -> Option<NormalizedValue> {
        self.tables
            .entry(entity_type.into())
            .or_default()
            .insert(value.id.clone(), value)
    }

    pub fn get(&self, entity_type: &str, id: &str) -> Option<&NormalizedValue> {
        self.tables.get(entity_type)?.get(id)
    }

    pub fn contains(&self, entity_type: &str, id: &str) -> bool {
        self.get(entity_type, id).is_some()
    }

    /// Returns the table for one type, if the type is present at all.
    pub fn table(&self, entity_type: &str) -> Option<&EntityTable> {
        self.tables.get(entity_type)
    }

    /// Types present in this store, including those with empty tables.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.tables.keys().map(String::as_str)
    }

    /// Total number of records across all types.
    pub fn len(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    /// True when no table holds a record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates `(type, record)` pairs ordered by type, then id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedValue)> + '_ {
        self.tables.iter().flat_map(|(entity_type, table)| {
            table
                .values()
                .map(move |value| (entity_type.as_str(), value))
        })
    }

    /// Lists referenced `(type, id)` pairs that have no entry in this store.
    ///
    /// An empty result means the store is closed under its references. Fields
    /// not declared by `schema` are skipped.
    ///
    /// # Errors
    /// - `GraphError::UnknownType` when the store holds an unregistered type.
    pub fn dangling_references<S>(&self, schema: &S) -> GraphResult<Vec<EntityKey>>
    where
        S: SchemaLookup + ?Sized,
    {
        let mut missing = BTreeSet::new();
        for (entity_type, table) in &self.tables {
            let fields = schema.reference_fields(entity_type)?;
            for value in table.values() {
                for field in fields {
                    let Some(reference) = value.reference(&field.name) else {
                        continue;
                    };
                    for id in reference.ids() {
                        if !self.contains(&field.target, id) {
                            missing.insert((field.target.clone(), id.clone()));
                        }
                    }
                }
            }
        }
        Ok(missing.into_iter().collect())
    }
}
