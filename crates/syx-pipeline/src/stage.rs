//! One LLM-backed extraction stage with bounded retries.
//!
//! The attempt loop is the only place the pipeline retries anything:
//! transient provider errors, unparseable output, and schema violations each
//! consume an attempt; fatal provider errors stop the loop at once. The
//! final failure kind and the attempt count are recorded in the stage
//! result, so a per-document failure is data, never an error.

use syx_config::{StageConfig, StageRole};
use syx_core::artifact::{FailureKind, Provenance, StageResult, StructuredRecord};
use syx_core::paper::Paper;
use syx_llm::{CompletionRequest, Provider};
use syx_schema::{SchemaError, SchemaRegistry};

use crate::prompts;

/// Executes one chain role against a provider backend.
pub struct ExtractionStage<'a, P> {
    provider: &'a P,
    registry: &'a SchemaRegistry,
    max_attempts: u32,
}

impl<'a, P: Provider> ExtractionStage<'a, P> {
    #[must_use]
    pub fn new(provider: &'a P, registry: &'a SchemaRegistry, max_attempts: u32) -> Self {
        Self {
            provider,
            registry,
            // A stage always gets at least one attempt.
            max_attempts: max_attempts.max(1),
        }
    }

    /// Run the stage to a terminal [`StageResult`].
    ///
    /// `completed` holds the results of upstream stages; prompts for later
    /// roles are assembled from their validated records.
    pub async fn run(
        &self,
        role: StageRole,
        config: &StageConfig,
        paper: &Paper,
        completed: &[StageResult],
    ) -> StageResult {
        let stage_name = role.as_str();
        let schema_name = config.schema_for(role);
        let schema = match self.registry.resolve(schema_name) {
            Ok(schema) => schema,
            // Preflight checks make this unreachable in executor-driven
            // runs; direct callers still get a classified failure.
            Err(err) => {
                return StageResult::failure(stage_name, FailureKind::Validation, 0, err.to_string());
            }
        };

        let request = CompletionRequest {
            stage: stage_name.to_string(),
            model: config.model.clone(),
            system_prompt: prompts::system_prompt(role, schema),
            user_prompt: prompts::user_prompt(role, paper, completed),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let mut last_kind = FailureKind::Provider;
        let mut last_detail = String::new();

        for attempt in 1..=self.max_attempts {
            match self.attempt(role, config, schema_name, &request, attempt).await {
                Attempt::Success(record) => return StageResult::success(stage_name, record),
                Attempt::Retryable { kind, detail } => {
                    tracing::debug!(
                        stage = stage_name,
                        document = %paper.id,
                        attempt,
                        kind = %kind,
                        "stage attempt failed"
                    );
                    last_kind = kind;
                    last_detail = detail;
                }
                Attempt::Fatal { kind, detail } => {
                    tracing::warn!(
                        stage = stage_name,
                        document = %paper.id,
                        attempt,
                        "stage failed fatally"
                    );
                    return StageResult::failure(stage_name, kind, attempt, detail);
                }
            }
        }

        StageResult::failure(stage_name, last_kind, self.max_attempts, last_detail)
    }

    async fn attempt(
        &self,
        role: StageRole,
        config: &StageConfig,
        schema_name: &str,
        request: &CompletionRequest,
        attempt: u32,
    ) -> Attempt {
        let raw = match self.provider.complete(request).await {
            Ok(raw) => raw,
            Err(err) if err.is_transient() => {
                return Attempt::Retryable {
                    kind: FailureKind::Provider,
                    detail: err.to_string(),
                };
            }
            Err(err) => {
                return Attempt::Fatal {
                    kind: FailureKind::Provider,
                    detail: err.to_string(),
                };
            }
        };

        let Some(value) = syx_llm::parse::extract_json(&raw) else {
            return Attempt::Retryable {
                kind: FailureKind::Parse,
                detail: format!("no JSON object in response: {}", truncate(&raw, 120)),
            };
        };

        match self.registry.validate(schema_name, &value) {
            Ok(()) => Attempt::Success(StructuredRecord {
                schema: schema_name.to_string(),
                value,
                provenance: Provenance {
                    stage: role.as_str().to_string(),
                    model: config.model.clone(),
                    prompt_variant: config.prompt_variant.clone(),
                    attempts: attempt,
                    raw_response: raw,
                    completed_at: chrono::Utc::now(),
                },
            }),
            Err(SchemaError::ValidationFailed { violations }) => Attempt::Retryable {
                kind: FailureKind::Validation,
                detail: violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            },
            Err(err) => Attempt::Fatal {
                kind: FailureKind::Validation,
                detail: err.to_string(),
            },
        }
    }
}

enum Attempt {
    Success(StructuredRecord),
    Retryable { kind: FailureKind, detail: String },
    Fatal { kind: FailureKind, detail: String },
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use syx_llm::{StubProvider, StubResponse};

    use super::*;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    fn paper() -> Paper {
        Paper::new("doc1", "Sample was heated to 400C for 2h.")
    }

    const VALID: &str = r#"{"synthesis_paragraphs": "heat 400C 2h"}"#;

    #[tokio::test]
    async fn valid_output_succeeds_first_attempt() {
        let stub = StubProvider::new().with_text("paragraph_extraction", VALID);
        let reg = registry();
        let stage = ExtractionStage::new(&stub, &reg, 3);

        let result = stage
            .run(
                StageRole::ParagraphExtraction,
                &StageConfig::default(),
                &paper(),
                &[],
            )
            .await;

        let record = result.record().expect("stage should succeed");
        assert_eq!(record.provenance.attempts, 1);
        assert_eq!(record.schema, "synthesis_paragraphs");
        assert_eq!(
            record.value,
            serde_json::json!({"synthesis_paragraphs": "heat 400C 2h"})
        );
        assert_eq!(stub.call_count("paragraph_extraction"), 1);
    }

    #[tokio::test]
    async fn always_invalid_output_consumes_exactly_max_attempts() {
        let stub =
            StubProvider::new().with_text("paragraph_extraction", r#"{"wrong_field": true}"#);
        let reg = registry();
        let stage = ExtractionStage::new(&stub, &reg, 3);

        let result = stage
            .run(
                StageRole::ParagraphExtraction,
                &StageConfig::default(),
                &paper(),
                &[],
            )
            .await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Validation));
        let syx_core::artifact::StageOutcome::Failure { attempts, .. } = result.outcome else {
            panic!("expected failure");
        };
        assert_eq!(attempts, 3);
        assert_eq!(stub.call_count("paragraph_extraction"), 3);
    }

    #[tokio::test]
    async fn transient_error_then_success_records_two_attempts() {
        let stub = StubProvider::new().with_script(
            "paragraph_extraction",
            [
                StubResponse::Transient("overloaded".into()),
                StubResponse::Text(VALID.into()),
            ],
        );
        let reg = registry();
        let stage = ExtractionStage::new(&stub, &reg, 3);

        let result = stage
            .run(
                StageRole::ParagraphExtraction,
                &StageConfig::default(),
                &paper(),
                &[],
            )
            .await;

        assert_eq!(result.record().unwrap().provenance.attempts, 2);
    }

    #[tokio::test]
    async fn fatal_provider_error_stops_immediately() {
        let stub = StubProvider::new().with_script(
            "paragraph_extraction",
            [StubResponse::Fatal("invalid api key".into())],
        );
        let reg = registry();
        let stage = ExtractionStage::new(&stub, &reg, 3);

        let result = stage
            .run(
                StageRole::ParagraphExtraction,
                &StageConfig::default(),
                &paper(),
                &[],
            )
            .await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Provider));
        assert_eq!(stub.call_count("paragraph_extraction"), 1);
    }

    #[tokio::test]
    async fn unparseable_output_is_a_parse_failure() {
        let stub = StubProvider::new().with_text("paragraph_extraction", "I cannot help with that");
        let reg = registry();
        let stage = ExtractionStage::new(&stub, &reg, 2);

        let result = stage
            .run(
                StageRole::ParagraphExtraction,
                &StageConfig::default(),
                &paper(),
                &[],
            )
            .await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Parse));
        assert_eq!(stub.call_count("paragraph_extraction"), 2);
    }

    #[tokio::test]
    async fn fenced_output_is_recovered_and_validated() {
        let stub = StubProvider::new().with_text(
            "paragraph_extraction",
            format!("Sure, here you go:\n```json\n{VALID}\n```"),
        );
        let reg = registry();
        let stage = ExtractionStage::new(&stub, &reg, 1);

        let result = stage
            .run(
                StageRole::ParagraphExtraction,
                &StageConfig::default(),
                &paper(),
                &[],
            )
            .await;

        assert!(result.is_success());
    }
}
