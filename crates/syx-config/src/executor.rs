//! Run-executor configuration.

use serde::{Deserialize, Serialize};

const fn default_max_concurrency() -> usize {
    4
}

const fn default_max_attempts() -> u32 {
    3
}

/// Concurrency and retry bounds for the run executor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExecutorConfig {
    /// Bound on concurrently running (paper, configuration) chains. Chosen to
    /// respect provider rate limits, not machine parallelism.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Attempts per stage before recording a documented failure.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-chain deadline in seconds. Unset means no deadline.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_attempts: default_max_attempts(),
            deadline_secs: None,
        }
    }
}
