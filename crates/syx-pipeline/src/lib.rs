//! # syx-pipeline
//!
//! The extraction pipeline for Synthex: paper loading, the four-role stage
//! chain, the bounded-concurrency run executor, and result aggregation.
//!
//! The unit of work is one (paper, configuration) pair. A unit always
//! terminates in a sealed [`RunArtifact`](syx_core::artifact::RunArtifact):
//! per-document failures are classified and recorded, never raised. Only
//! configuration mistakes, an unreadable data directory, and result-sink I/O
//! abort a run, and the first two are caught before any unit is scheduled.

mod aggregate;
mod chain;
mod error;
mod executor;
mod loader;
pub mod prompts;
mod score;
mod stage;
#[cfg(test)]
mod testutil;

pub use aggregate::Aggregator;
pub use chain::StageChain;
pub use error::PipelineError;
pub use executor::Executor;
pub use loader::{FsPaperLoader, PaperLoad};
pub use score::{JudgeScorer, RandomScorer, Scorer, scorer_by_name};
pub use stage::ExtractionStage;
