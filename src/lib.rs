//! An in-memory, mutable model of a GraphQL schema.
//!
//! The document itself is an [`apollo_compiler::Schema`]; this crate wraps it
//! in [`CoreSchema`], which keeps two pieces of bookkeeping in sync with every
//! mutation:
//!
//! - a back-reference index ([`schema::referencer`]) recording, for each named
//!   type and directive, every element that refers to it, and
//! - the schema's `@core`/`@link` feature metadata ([`link`]), recomputed
//!   whenever the schema definition's directive list changes.
//!
//! Mutations go through the position types in [`schema::position`], which
//! address schema elements by name rather than by reference. Validation is
//! delegated to apollo-compiler, except for checking that user redefinitions
//! of built-in types and directives stay structurally compatible.
//! [`ValidCoreSchema::to_api_schema`] derives the consumer-facing schema with
//! inaccessible elements and feature machinery stripped.

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod error;
pub mod link;
pub mod schema;
pub mod values;

pub use crate::error::SchemaError;
pub use crate::schema::CoreSchema;
pub use crate::schema::ValidCoreSchema;
