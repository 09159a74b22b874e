//! Core metadata model, index snapshots, and query engine for incipit.
//!
//! This crate defines the immutable value types (Artist, Album, Track), the
//! Index snapshot built from an ordered catalogue, and the exact and fuzzy
//! multi-field query semantics evaluated against a snapshot.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod index;
pub mod model;
pub mod query;

pub use index::Index;
pub use model::{Album, Artist, Track};
pub use query::{Field, Query, QueryBuilder, QueryError, SearchResult};
