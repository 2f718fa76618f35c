//! Entity record model for denormalized and normalized projections.
//!
//! # Responsibility
//! - Define the two record shapes the walkers convert between.
//! - Keep identity by `(type, id)` rather than by object address.
//!
//! # Invariants
//! - Every stored entity is identified by a non-empty `EntityId`.
//! - Ids are unique per `EntityType` only, never across types.

pub mod entity;
