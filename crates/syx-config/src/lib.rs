//! # syx-config
//!
//! Layered configuration loading and sweep composition for Synthex using
//! figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. CLI overrides (`-S group.path.key=value`, applied by the [`Composer`])
//! 2. Environment variables (`SYNTHEX_*` prefix, `__` as separator)
//! 3. Project-level `.synthex/config.toml`
//! 4. User-level `~/.config/synthex/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SYNTHEX_EXECUTOR__MAX_ATTEMPTS` -> `executor.max_attempts`,
//! `SYNTHEX_JUDGE__MODEL` -> `judge.model`, etc. The `__` (double underscore)
//! separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use syx_config::{Composer, SynthexConfig};
//!
//! let base = SynthexConfig::load_with_dotenv().expect("config");
//! let mut composer = Composer::new(base);
//! composer.parse_assignment("judge.model=gpt-4o,mistral-large").expect("override");
//! for point in composer.compose().expect("compose") {
//!     let run_config = point.expect("sweep point");
//!     println!("{:?}", run_config.sweep_point_id);
//! }
//! ```

mod compose;
mod data;
mod error;
mod executor;
mod result;
mod stages;

pub use compose::{Composer, RunConfig, SweepPoints};
pub use data::DataConfig;
pub use error::ConfigError;
pub use executor::ExecutorConfig;
pub use result::ResultConfig;
pub use stages::{StageConfig, StageRole};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The complete resolved configuration of one Synthex run (before overrides).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SynthexConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub paragraph_extraction: StageConfig,
    #[serde(default)]
    pub material_extraction: StageConfig,
    #[serde(default)]
    pub synthesis_extraction: StageConfig,
    #[serde(default)]
    pub judge: StageConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub result: ResultConfig,
}

impl SynthexConfig {
    /// Load configuration from all sources (TOML files + environment
    /// variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if extraction fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for the CLI and
    /// tests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if extraction fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add additional
    /// providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".synthex/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("SYNTHEX_").split("__"))
    }

    /// The stage backend configuration for a chain role.
    #[must_use]
    pub const fn stage(&self, role: StageRole) -> &StageConfig {
        match role {
            StageRole::ParagraphExtraction => &self.paragraph_extraction,
            StageRole::MaterialExtraction => &self.material_extraction,
            StageRole::SynthesisExtraction => &self.synthesis_extraction,
            StageRole::Judge => &self.judge,
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("synthex").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir
    /// looking for a `.env` file. Silently does nothing if no `.env` is
    /// found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // Walk up at most 3 levels (crate -> crates/ -> workspace root)
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
