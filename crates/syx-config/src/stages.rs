//! Per-stage backend configuration.
//!
//! Each chain role gets its own configuration group so a sweep can vary one
//! stage's model without touching the others (e.g.
//! `-S synthesis_extraction.model=gpt-4o,mistral-large`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed chain roles, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    ParagraphExtraction,
    MaterialExtraction,
    SynthesisExtraction,
    Judge,
}

impl StageRole {
    /// All roles in chain order.
    pub const ALL: [Self; 4] = [
        Self::ParagraphExtraction,
        Self::MaterialExtraction,
        Self::SynthesisExtraction,
        Self::Judge,
    ];

    /// Configuration-group name of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParagraphExtraction => "paragraph_extraction",
            Self::MaterialExtraction => "material_extraction",
            Self::SynthesisExtraction => "synthesis_extraction",
            Self::Judge => "judge",
        }
    }

    /// Name of the schema this role's output must satisfy.
    #[must_use]
    pub const fn default_schema(self) -> &'static str {
        match self {
            Self::ParagraphExtraction => "synthesis_paragraphs",
            Self::MaterialExtraction => "material_list",
            Self::SynthesisExtraction => "general_synthesis",
            Self::Judge => "synthesis_evaluation",
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_prompt_variant() -> String {
    "default".to_string()
}

const fn default_temperature() -> f64 {
    0.0
}

/// Backend selection for one extraction stage.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StageConfig {
    /// Short model name resolved through the syx-llm model registry.
    #[serde(default = "default_model")]
    pub model: String,

    /// Prompt variant name, recorded in provenance.
    #[serde(default = "default_prompt_variant")]
    pub prompt_variant: String,

    /// Extraction schema the stage output must satisfy. Empty means the
    /// role's default schema.
    #[serde(default)]
    pub schema: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Token cap for the provider call. Unset means provider default.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            prompt_variant: default_prompt_variant(),
            schema: String::new(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl StageConfig {
    /// The schema name to validate against, falling back to the role default.
    #[must_use]
    pub fn schema_for(&self, role: StageRole) -> &str {
        if self.schema.is_empty() {
            role.default_schema()
        } else {
            &self.schema
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn roles_are_in_chain_order() {
        let names: Vec<&str> = StageRole::ALL.iter().map(|r| r.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "paragraph_extraction",
                "material_extraction",
                "synthesis_extraction",
                "judge"
            ]
        );
    }

    #[test]
    fn schema_falls_back_to_role_default() {
        let config = StageConfig::default();
        assert_eq!(
            config.schema_for(StageRole::SynthesisExtraction),
            "general_synthesis"
        );

        let custom = StageConfig {
            schema: "alchemybench".into(),
            ..StageConfig::default()
        };
        assert_eq!(custom.schema_for(StageRole::SynthesisExtraction), "alchemybench");
    }

    #[test]
    fn defaults_are_deterministic() {
        let config = StageConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.prompt_variant, "default");
        assert!((config.temperature - 0.0).abs() < f64::EPSILON);
        assert!(config.max_tokens.is_none());
    }
}
