//! Traversal-scoped `(type, id)` visitation record for cycle detection.
//!
//! # Invariants
//! - A key is active only while the guard returned by `enter` is alive.
//! - Guards release their key on every exit path, including `?` returns.

use crate::model::entity::EntityKey;
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

/// Keys of the entities currently being expanded on the recursion stack.
#[derive(Debug, Default)]
pub struct VisitSet {
    active: HashSet<EntityKey>,
}

impl VisitSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn contains(&self, entity_type: &str, id: &str) -> bool {
        self.active
            .contains(&(entity_type.to_string(), id.to_string()))
    }

    /// Marks `(entity_type, id)` as in progress.
    ///
    /// Returns `None` when the key is already active, which means the caller
    /// reached one of its own ancestors.
    pub fn enter(&mut self, entity_type: &str, id: &str) -> Option<VisitGuard<'_>> {
        let key = (entity_type.to_string(), id.to_string());
        if !self.active.insert(key.clone()) {
            return None;
        }
        Some(VisitGuard { set: self, key })
    }
}

/// Scoped hold on one active key. Derefs to the owning set so recursion can
/// continue through the guard.
#[derive(Debug)]
pub struct VisitGuard<'a> {
    set: &'a mut VisitSet,
    key: EntityKey,
}

impl Deref for VisitGuard<'_> {
    type Target = VisitSet;

    fn deref(&self) -> &Self::Target {
        self.set
    }
}

impl DerefMut for VisitGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.set
    }
}

impl Drop for VisitGuard<'_> {
    fn drop(&mut self) {
        self.set.active.remove(&self.key);
    }
}
