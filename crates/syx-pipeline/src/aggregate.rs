//! Result sink: per-unit artifact files, an append-only JSONL log, and the
//! end-of-run summary.
//!
//! Layout under `<run_dir>/<run_id>/`:
//! - `<document>.json` (single runs) or `<point>/<document>.json` (sweeps)
//! - `artifacts.jsonl`, one line per sealed artifact in completion order
//! - `summary.json`, written once by [`Aggregator::finalize`]

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use serde_jsonlines::append_json_lines;
use syx_core::artifact::{RunArtifact, RunSummary, StageOutcome, StageStats};

use crate::error::PipelineError;

/// Collects sealed artifacts for one run and derives its summary.
pub struct Aggregator {
    run_id: String,
    run_dir: PathBuf,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    keys: HashSet<String>,
    total_units: u64,
    succeeded_units: u64,
    stage_stats: Vec<StageStats>,
    failure_histogram: BTreeMap<String, u64>,
    score_sum: f64,
    score_count: u64,
}

impl Aggregator {
    /// Create the sink for one run, rooted at `<base_dir>/<run_id>`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Sink`] if the run directory cannot be
    /// created.
    pub fn new(base_dir: impl Into<PathBuf>, run_id: impl Into<String>) -> Result<Self, PipelineError> {
        let run_id = run_id.into();
        let run_dir = base_dir.into().join(&run_id);
        std::fs::create_dir_all(&run_dir)?;
        Ok(Self {
            run_id,
            run_dir,
            state: Mutex::new(State::default()),
        })
    }

    /// Directory this run's results land in.
    #[must_use]
    pub fn run_dir(&self) -> &std::path::Path {
        &self.run_dir
    }

    /// Record one sealed artifact: update the running statistics and persist
    /// the artifact to its per-unit file and the JSONL log.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DuplicateKey`] if an artifact with the same
    /// key was already recorded, or [`PipelineError::Sink`] on I/O failure.
    pub fn record(&self, artifact: &RunArtifact) -> Result<(), PipelineError> {
        {
            let mut state = self.state.lock().expect("aggregator state lock");
            let key = artifact.key();
            if !state.keys.insert(key.clone()) {
                return Err(PipelineError::DuplicateKey(key));
            }

            state.total_units += 1;
            if artifact.is_complete_success() {
                state.succeeded_units += 1;
            }
            if let Some(score) = artifact.score {
                state.score_sum += score;
                state.score_count += 1;
            }
            for stage in &artifact.stages {
                let stats = stage_entry(&mut state.stage_stats, &stage.stage);
                match &stage.outcome {
                    StageOutcome::Success { .. } => stats.succeeded += 1,
                    StageOutcome::Failure { kind, .. } => {
                        stats.failed += 1;
                        *state
                            .failure_histogram
                            .entry(kind.as_str().to_string())
                            .or_insert(0) += 1;
                    }
                    StageOutcome::Skipped => stats.skipped += 1,
                }
            }
        }

        self.persist(artifact)
    }

    fn persist(&self, artifact: &RunArtifact) -> Result<(), PipelineError> {
        let unit_dir = match &artifact.sweep_point_id {
            Some(point) => self.run_dir.join(point),
            None => self.run_dir.clone(),
        };
        std::fs::create_dir_all(&unit_dir)?;

        let unit_path = unit_dir.join(format!("{}.json", artifact.document_id));
        std::fs::write(&unit_path, serde_json::to_vec_pretty(artifact)?)?;

        append_json_lines(self.run_dir.join("artifacts.jsonl"), [artifact])?;
        Ok(())
    }

    /// Seal the run: write `summary.json` and return the summary.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Sink`] on I/O failure.
    pub fn finalize(&self) -> Result<RunSummary, PipelineError> {
        let summary = {
            let state = self.state.lock().expect("aggregator state lock");
            #[allow(clippy::cast_precision_loss)]
            let mean_score = (state.score_count > 0)
                .then(|| state.score_sum / state.score_count as f64);
            RunSummary {
                run_id: self.run_id.clone(),
                total_units: state.total_units,
                succeeded_units: state.succeeded_units,
                stage_stats: state.stage_stats.clone(),
                failure_histogram: state.failure_histogram.clone(),
                mean_score,
                finalized_at: chrono::Utc::now(),
            }
        };

        std::fs::write(
            self.run_dir.join("summary.json"),
            serde_json::to_vec_pretty(&summary)?,
        )?;
        tracing::info!(
            run_id = %summary.run_id,
            total = summary.total_units,
            succeeded = summary.succeeded_units,
            "run finalized"
        );
        Ok(summary)
    }
}

/// Stats slot for a stage, created in first-seen order. Artifacts list their
/// stages in chain order, so the summary does too.
fn stage_entry<'a>(stats: &'a mut Vec<StageStats>, stage: &str) -> &'a mut StageStats {
    if let Some(idx) = stats.iter().position(|s| s.stage == stage) {
        return &mut stats[idx];
    }
    stats.push(StageStats {
        stage: stage.to_string(),
        ..StageStats::default()
    });
    stats.last_mut().expect("just pushed")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_jsonlines::json_lines;
    use syx_core::artifact::{FailureKind, Provenance, StageResult, StructuredRecord};

    use super::*;

    fn success_artifact(run_id: &str, point: Option<&str>, doc: &str, score: f64) -> RunArtifact {
        let record = StructuredRecord {
            schema: "synthesis_paragraphs".into(),
            value: serde_json::json!({"synthesis_paragraphs": "heat"}),
            provenance: Provenance {
                stage: "paragraph_extraction".into(),
                model: "stub".into(),
                prompt_variant: "default".into(),
                attempts: 1,
                raw_response: String::new(),
                completed_at: Utc::now(),
            },
        };
        RunArtifact {
            run_id: run_id.into(),
            sweep_point_id: point.map(Into::into),
            document_id: doc.into(),
            stages: vec![StageResult::success("paragraph_extraction", record)],
            score: Some(score),
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    fn failed_artifact(run_id: &str, doc: &str) -> RunArtifact {
        RunArtifact {
            run_id: run_id.into(),
            sweep_point_id: None,
            document_id: doc.into(),
            stages: vec![
                StageResult::failure("paragraph_extraction", FailureKind::Parse, 3, "no JSON"),
                StageResult::skipped("material_extraction"),
            ],
            score: None,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn records_land_in_per_unit_files_and_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let agg = Aggregator::new(dir.path(), "run-1").unwrap();

        agg.record(&success_artifact("run-1", None, "alpha", 4.0))
            .unwrap();
        agg.record(&success_artifact("run-1", Some("point-000"), "beta", 2.0))
            .unwrap();

        assert!(dir.path().join("run-1/alpha.json").exists());
        assert!(dir.path().join("run-1/point-000/beta.json").exists());

        let lines: Vec<RunArtifact> = json_lines(dir.path().join("run-1/artifacts.jsonl"))
            .unwrap()
            .collect::<std::io::Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].document_id, "alpha");
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let agg = Aggregator::new(dir.path(), "run-1").unwrap();

        agg.record(&success_artifact("run-1", None, "alpha", 4.0))
            .unwrap();
        let err = agg
            .record(&success_artifact("run-1", None, "alpha", 4.0))
            .unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateKey(_)));
    }

    #[test]
    fn summary_counts_every_unit_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let agg = Aggregator::new(dir.path(), "run-1").unwrap();

        agg.record(&success_artifact("run-1", None, "alpha", 4.0))
            .unwrap();
        agg.record(&success_artifact("run-1", None, "beta", 2.0))
            .unwrap();
        agg.record(&failed_artifact("run-1", "gamma")).unwrap();

        let summary = agg.finalize().unwrap();
        assert_eq!(summary.total_units, 3);
        assert_eq!(summary.succeeded_units, 2);
        assert_eq!(summary.mean_score, Some(3.0));
        assert_eq!(summary.failure_histogram.get("parse"), Some(&1));

        let para = &summary.stage_stats[0];
        assert_eq!(para.stage, "paragraph_extraction");
        assert_eq!(para.succeeded, 2);
        assert_eq!(para.failed, 1);

        let material = &summary.stage_stats[1];
        assert_eq!(material.skipped, 1);

        assert!(dir.path().join("run-1/summary.json").exists());
    }

    #[test]
    fn empty_run_finalizes_without_score() {
        let dir = tempfile::tempdir().unwrap();
        let agg = Aggregator::new(dir.path(), "run-1").unwrap();
        let summary = agg.finalize().unwrap();
        assert_eq!(summary.total_units, 0);
        assert_eq!(summary.mean_score, None);
    }
}
