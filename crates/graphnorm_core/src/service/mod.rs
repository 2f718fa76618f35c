//! Use-case services exposed to core callers.
//!
//! # Responsibility
//! - Compose schema lookup, graph walkers and JSON codec behind one API.
//! - Emit metadata-only log events for each call.
//!
//! # Invariants
//! - Services stay stateless between calls; every call owns its traversal.

pub mod graph_service;
