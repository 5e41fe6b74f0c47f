//! Model registry: short model names to provider endpoints.
//!
//! Mirrors the provider zoo the benchmark sweeps over. Every entry speaks
//! the OpenAI-compatible chat-completions dialect; non-OpenAI vendors are
//! reached through their compatibility endpoints.

use std::collections::HashMap;

use crate::error::ProviderError;

const OPENAI_BASE: &str = "https://api.openai.com/v1";
const MISTRAL_BASE: &str = "https://api.mistral.ai/v1";

/// Endpoint coordinates for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Provider-side model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_base: String,
}

impl ModelSpec {
    fn openai(model: &str) -> Self {
        Self {
            model: model.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_base: OPENAI_BASE.to_string(),
        }
    }

    fn mistral(model: &str) -> Self {
        Self {
            model: model.to_string(),
            api_key_env: "MISTRAL_API_KEY".to_string(),
            api_base: MISTRAL_BASE.to_string(),
        }
    }
}

/// Registry of short model names usable in stage configuration.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    specs: HashMap<String, ModelSpec>,
}

impl ModelRegistry {
    /// Build the built-in registry.
    #[must_use]
    pub fn new() -> Self {
        let mut specs = HashMap::new();
        specs.insert("gpt-4o".to_string(), ModelSpec::openai("gpt-4o"));
        specs.insert("gpt-4o-mini".to_string(), ModelSpec::openai("gpt-4o-mini"));
        specs.insert(
            "gpt-4.1".to_string(),
            ModelSpec::openai("gpt-4.1-2025-04-14"),
        );
        specs.insert(
            "gpt-o4-mini".to_string(),
            ModelSpec::openai("o4-mini-2025-04-16"),
        );
        specs.insert(
            "mistral-small".to_string(),
            ModelSpec::mistral("mistral-small-latest"),
        );
        specs.insert(
            "mistral-medium".to_string(),
            ModelSpec::mistral("mistral-medium-latest"),
        );
        specs.insert(
            "mistral-large".to_string(),
            ModelSpec::mistral("mistral-large-latest"),
        );
        Self { specs }
    }

    /// Register or replace a model entry (e.g. a local endpoint).
    pub fn insert(&mut self, name: impl Into<String>, spec: ModelSpec) {
        self.specs.insert(name.into(), spec);
    }

    /// Resolve a short model name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownModel`] for names not in the registry.
    pub fn resolve(&self, name: &str) -> Result<&ModelSpec, ProviderError> {
        self.specs
            .get(name)
            .ok_or_else(|| ProviderError::UnknownModel(name.to_string()))
    }

    /// Sorted list of registered short names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.specs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
