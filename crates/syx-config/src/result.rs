//! Result-sink configuration.

use serde::{Deserialize, Serialize};

fn default_run_dir() -> String {
    "results".to_string()
}

fn default_scorer() -> String {
    "random".to_string()
}

/// Where artifacts land and how they are scored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResultConfig {
    /// Root directory for run artifact directories.
    #[serde(default = "default_run_dir")]
    pub run_dir: String,

    /// Scorer variant name. `random` is the documented placeholder default;
    /// real scorers register under their own names.
    #[serde(default = "default_scorer")]
    pub scorer: String,
}

impl Default for ResultConfig {
    fn default() -> Self {
        Self {
            run_dir: default_run_dir(),
            scorer: default_scorer(),
        }
    }
}
