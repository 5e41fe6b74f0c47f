//! Pipeline error types.
//!
//! Everything here is fatal to the whole run: it is raised during preflight
//! or by the result sink, never by per-document stage work. Per-document
//! failures are data (`StageOutcome::Failure`), not errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage references a schema the registry does not hold, or schema
    /// compilation failed. Caught in preflight.
    #[error(transparent)]
    Schema(#[from] syx_schema::SchemaError),

    /// The composed configuration is unusable (unknown scorer, unknown
    /// model, empty chain).
    #[error("invalid run configuration: {0}")]
    InvalidRunConfig(String),

    /// Result sink I/O failed.
    #[error("result sink error: {0}")]
    Sink(#[from] std::io::Error),

    /// An artifact or summary could not be serialized.
    #[error("artifact serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The same artifact key was recorded twice.
    #[error("artifact key already recorded: {0}")]
    DuplicateKey(String),

    /// The input directory could not be enumerated.
    #[error("data source error at {path}: {source}")]
    DataSource {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
