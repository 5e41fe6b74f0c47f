//! # syx-core
//!
//! Core types shared across all Synthex crates:
//! - `Paper`: one input document (publication text + supporting information)
//! - Stage outcome types: `StructuredRecord`, `StageResult`, `FailureKind`
//! - `RunArtifact`: the sealed record of one paper's journey through a chain
//! - `RunSummary`: aggregate statistics over a finished run
//! - Run identifier helpers
//! - The synthesis ontology types (schemars-derived, validated by syx-schema)

pub mod artifact;
pub mod ids;
pub mod ontology;
pub mod paper;
