//! Stage outcomes, run artifacts, and run summaries.
//!
//! A `RunArtifact` is created once per (paper, configuration) unit and is
//! sealed when the chain terminates; later attempts produce new results,
//! never in-place edits.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FailureKind
// ---------------------------------------------------------------------------

/// Classification of per-unit failures recorded in artifacts.
///
/// Configuration errors are not represented here: they abort the whole run
/// before any unit is scheduled and live in `syx_config::ConfigError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The delegated LLM call failed (transport, rate limit, API error).
    Provider,
    /// Model output could not be parsed into a JSON candidate record.
    Parse,
    /// The candidate record violated the stage's extraction schema.
    Validation,
    /// The chain-level deadline expired while this stage was in flight.
    Timeout,
    /// The document text could not be obtained. Not retried.
    Load,
}

impl FailureKind {
    /// String form used in summaries and the failure histogram.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Parse => "parse",
            Self::Validation => "validation",
            Self::Timeout => "timeout",
            Self::Load => "load",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StructuredRecord
// ---------------------------------------------------------------------------

/// Where a structured record came from: which stage, backend, and attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Stage role that produced the record (e.g. `synthesis_extraction`).
    pub stage: String,
    /// Model identifier used for the call.
    pub model: String,
    /// Prompt variant name from the stage's backend configuration.
    pub prompt_variant: String,
    /// Attempts consumed, including the successful one.
    pub attempts: u32,
    /// Raw model response the record was parsed from.
    pub raw_response: String,
    /// When the stage finished.
    pub completed_at: DateTime<Utc>,
}

/// A schema-conformant extraction result from one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    /// Name of the schema the payload was validated against.
    pub schema: String,
    /// The validated payload.
    pub value: serde_json::Value,
    pub provenance: Provenance,
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Terminal outcome of one stage within a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    /// The stage produced a validated record.
    Success { record: StructuredRecord },
    /// All attempts were consumed (or a fatal error cut them short).
    Failure {
        kind: FailureKind,
        /// Attempts consumed before giving up.
        attempts: u32,
        /// Human-readable detail from the final attempt.
        detail: String,
    },
    /// An upstream stage failed, so this stage was never invoked.
    Skipped,
}

/// One stage's entry in a run artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage role name.
    pub stage: String,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

impl StageResult {
    #[must_use]
    pub fn success(stage: impl Into<String>, record: StructuredRecord) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Success { record },
        }
    }

    #[must_use]
    pub fn failure(
        stage: impl Into<String>,
        kind: FailureKind,
        attempts: u32,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Failure {
                kind,
                attempts,
                detail: detail.into(),
            },
        }
    }

    #[must_use]
    pub fn skipped(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Skipped,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, StageOutcome::Success { .. })
    }

    /// The validated record, if this stage succeeded.
    #[must_use]
    pub const fn record(&self) -> Option<&StructuredRecord> {
        match &self.outcome {
            StageOutcome::Success { record } => Some(record),
            _ => None,
        }
    }

    /// The failure classification, if this stage failed.
    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            StageOutcome::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RunArtifact
// ---------------------------------------------------------------------------

/// The sealed record of one (paper, configuration) unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifact {
    pub run_id: String,
    /// Sweep point this unit belongs to. `None` for single runs.
    pub sweep_point_id: Option<String>,
    pub document_id: String,
    /// One entry per chain stage, in chain order. Complete even on failure:
    /// downstream stages appear as `skipped`.
    pub stages: Vec<StageResult>,
    /// Score from the configured scorer, when the chain reached the end.
    pub score: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RunArtifact {
    /// Unique sink key for this artifact within its run.
    #[must_use]
    pub fn key(&self) -> String {
        match &self.sweep_point_id {
            Some(point) => format!("{}/{point}/{}", self.run_id, self.document_id),
            None => format!("{}/{}", self.run_id, self.document_id),
        }
    }

    /// Whether every stage in the chain succeeded.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.stages.iter().all(StageResult::is_success)
    }
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Per-stage aggregate counts within a run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: String,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl StageStats {
    /// Fraction of invoked (non-skipped) executions that succeeded.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let invoked = self.succeeded + self.failed;
        if invoked == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                self.succeeded as f64 / invoked as f64
            }
        }
    }
}

/// Descriptive statistics over every scheduled unit of a run.
///
/// Every (document, configuration) pair that was scheduled appears in the
/// counts exactly once, either as a success or as a classified failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    /// Total scheduled units.
    pub total_units: u64,
    /// Units where every stage succeeded.
    pub succeeded_units: u64,
    /// Per-stage counts, in chain order.
    pub stage_stats: Vec<StageStats>,
    /// Failure-kind histogram over all failed stages.
    pub failure_histogram: BTreeMap<String, u64>,
    /// Mean score over units that were scored.
    pub mean_score: Option<f64>,
    pub finalized_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(stage: &str) -> StructuredRecord {
        StructuredRecord {
            schema: "synthesis_paragraphs".into(),
            value: serde_json::json!({"synthesis_paragraphs": "heat 400C 2h"}),
            provenance: Provenance {
                stage: stage.into(),
                model: "stub".into(),
                prompt_variant: "default".into(),
                attempts: 1,
                raw_response: String::new(),
                completed_at: Utc::now(),
            },
        }
    }

    fn artifact(point: Option<&str>) -> RunArtifact {
        RunArtifact {
            run_id: "run-1".into(),
            sweep_point_id: point.map(Into::into),
            document_id: "doc1".into(),
            stages: vec![
                StageResult::success("paragraph_extraction", record("paragraph_extraction")),
                StageResult::failure(
                    "material_extraction",
                    FailureKind::Validation,
                    3,
                    "missing required field",
                ),
                StageResult::skipped("synthesis_extraction"),
            ],
            score: None,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn single_run_key_omits_sweep_point() {
        assert_eq!(artifact(None).key(), "run-1/doc1");
    }

    #[test]
    fn multirun_key_includes_sweep_point() {
        assert_eq!(artifact(Some("point-000")).key(), "run-1/point-000/doc1");
    }

    #[test]
    fn failed_artifact_is_not_complete_success() {
        assert!(!artifact(None).is_complete_success());
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::Validation).unwrap();
        assert_eq!(json, r#""validation""#);
    }

    #[test]
    fn stage_outcome_roundtrips_with_status_tag() {
        let result = StageResult::failure("judge", FailureKind::Provider, 2, "boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "provider");
        let back: StageResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn success_rate_ignores_skipped() {
        let stats = StageStats {
            stage: "judge".into(),
            succeeded: 3,
            failed: 1,
            skipped: 10,
        };
        assert!((stats.success_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn success_rate_is_zero_when_never_invoked() {
        let stats = StageStats {
            stage: "judge".into(),
            ..StageStats::default()
        };
        assert!(stats.success_rate().abs() < f64::EPSILON);
    }
}
