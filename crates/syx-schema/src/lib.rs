//! # syx-schema
//!
//! Extraction-schema registry and structural validation for Synthex.
//!
//! This crate provides:
//! - `SchemaRegistry`: store of every extraction schema known to a run
//! - Structural validation of candidate records via `jsonschema`
//! - Schema export for the `syx schema` command
//!
//! ## Architecture
//!
//! Ontology types are defined in `syx-core` with `#[derive(JsonSchema)]`.
//! This crate imports those types and provides the registry and validation
//! layer. The registry is built before any unit is scheduled and is read-only
//! afterwards, so concurrent chains share it without locks.

mod error;
mod registry;

pub use error::{SchemaError, Violation};
pub use registry::SchemaRegistry;
