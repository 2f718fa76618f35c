//! Structural codecs for entity records and stores.
//!
//! # Responsibility
//! - Map records and stores to and from JSON with the obvious layout
//!   (entity type -> top-level key, id -> nested key).
//!
//! # Invariants
//! - Decoding is schema-guided: only declared fields become references.
//! - Absent reference fields are never emitted as `null` or `[]`.

pub mod json;
