//! Total, field-level merge of partial entity stores.
//!
//! # Invariants
//! - Merge never fails.
//! - For one `(type, id)`, later stores win per field; fields only seen earlier
//!   survive.
//! - Tables present in any input (even empty) are present in the output.

use super::{EntityStore, EntityTable};
use std::collections::btree_map::Entry;

/// Merges stores in sequence order.
pub fn merge(stores: impl IntoIterator<Item = EntityStore>) -> EntityStore {
    stores
        .into_iter()
        .fold(EntityStore::new(), |mut merged, store| {
            merged.absorb(store);
            merged
        })
}

impl EntityStore {
    /// Folds `later` into this store; `later` wins on field conflicts.
    pub fn absorb(&mut self, later: EntityStore) {
        for (entity_type, table) in later.tables {
            match self.tables.entry(entity_type) {
                Entry::Vacant(slot) => {
                    slot.insert(table);
                }
                Entry::Occupied(mut slot) => absorb_table(slot.get_mut(), table),
            }
        }
    }
}

fn absorb_table(target: &mut EntityTable, later: EntityTable) {
    for (id, value) in later {
        match target.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => slot.get_mut().merge_from(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::merge;
    use crate::model::entity::{NormalizedValue, Reference};
    use crate::store::EntityStore;
    use serde_json::json;

    #[test]
    fn merge_of_nothing_is_empty() {
        let merged = merge(Vec::new());
        assert!(merged.is_empty());
        assert_eq!(merged.entity_types().count(), 0);
    }

    #[test]
    fn disjoint_entities_are_unioned() {
        let merged = merge([
            EntityStore::singleton("photo", NormalizedValue::new("foo")),
            EntityStore::singleton("user", NormalizedValue::new("bar")),
            EntityStore::with_types(["album"]),
        ]);

        assert_eq!(merged.len(), 2);
        assert!(merged.contains("photo", "foo"));
        assert!(merged.contains("user", "bar"));
        assert!(merged.table("album").unwrap().is_empty());
    }

    #[test]
    fn later_store_wins_per_field() {
        let first = EntityStore::singleton(
            "user",
            NormalizedValue::new("bar")
                .with_attribute("name", "Ada")
                .with_attribute("email", "ada@example.com")
                .with_reference("photos", Reference::Many(vec!["p1".to_string()])),
        );
        let second = EntityStore::singleton(
            "user",
            NormalizedValue::new("bar")
                .with_attribute("name", "Ada L.")
                .with_reference("photos", Reference::Many(vec!["p2".to_string()])),
        );

        let merged = merge([first, second]);
        let user = merged.get("user", "bar").unwrap();
        assert_eq!(user.attributes["name"], json!("Ada L."));
        assert_eq!(user.attributes["email"], json!("ada@example.com"));
        assert_eq!(
            user.reference("photos"),
            Some(&Reference::Many(vec!["p2".to_string()]))
        );
    }

    #[test]
    fn empty_contribution_does_not_erase_fields() {
        let full = EntityStore::singleton(
            "photo",
            NormalizedValue::new("foo").with_reference("user", Reference::One("bar".to_string())),
        );

        let mut merged = full.clone();
        merged.absorb(EntityStore::new());
        assert_eq!(merged, full);
    }
}
