//! Data-loader configuration.

use serde::{Deserialize, Serialize};

fn default_source() -> String {
    "local".to_string()
}

fn default_data_dir() -> String {
    "data/papers".to_string()
}

/// Where input papers come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataConfig {
    /// Data source variant. Only `local` (plain-text directory) is built in;
    /// the name is the seam for alternative loaders.
    #[serde(default = "default_source")]
    pub source: String,

    /// Directory of `<stem>.txt` papers with optional `<stem>_SI.txt`
    /// supporting-information files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Cap on the number of papers loaded. Unset means all.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            data_dir: default_data_dir(),
            limit: None,
        }
    }
}
