//! Run executor: schedules every (document, configuration) unit of a run.
//!
//! Units are independent, so they run on a `JoinSet` bounded by a semaphore
//! sized from `executor.max_concurrency`. Artifacts are recorded serially as
//! tasks finish; the run always finalizes with every scheduled unit counted
//! exactly once.

use std::sync::Arc;

use chrono::Utc;
use syx_config::{RunConfig, StageRole, SynthexConfig};
use syx_core::artifact::{FailureKind, RunArtifact, RunSummary, StageResult};
use syx_llm::Provider;
use syx_schema::SchemaRegistry;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::aggregate::Aggregator;
use crate::chain::StageChain;
use crate::error::PipelineError;
use crate::loader::{FsPaperLoader, PaperLoad};
use crate::score::{Scorer, scorer_by_name};

type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Drives a run (single or sweep) end to end against one provider.
pub struct Executor<P> {
    provider: Arc<P>,
    registry: Arc<SchemaRegistry>,
    on_progress: Option<ProgressFn>,
}

impl<P: Provider + 'static> Executor<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            provider,
            registry,
            on_progress: None,
        }
    }

    /// Install a progress callback, called with (completed, total) after
    /// each unit is recorded.
    #[must_use]
    pub fn with_progress(mut self, f: impl Fn(u64, u64) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Execute every sweep point in `points` against every loadable paper.
    ///
    /// Results land under `<result.run_dir>/<run_id>/`. The data source and
    /// result sink come from the first point; sweeping those fields is not
    /// supported.
    ///
    /// # Errors
    ///
    /// Fails before scheduling anything if preflight rejects the
    /// configuration, the data directory cannot be enumerated, or the run
    /// directory cannot be created. After scheduling, only sink I/O and
    /// worker panics abort the run.
    pub async fn execute(
        &self,
        run_id: &str,
        points: Vec<RunConfig>,
    ) -> Result<RunSummary, PipelineError> {
        let scorers = self.preflight(&points)?;
        let base = &points[0].config;

        let aggregator = Aggregator::new(&base.result.run_dir, run_id)?;
        let loads: Vec<Arc<PaperLoad>> = FsPaperLoader::new(&base.data.data_dir, base.data.limit)
            .load()?
            .into_iter()
            .map(Arc::new)
            .collect();

        let total = (points.len() * loads.len()) as u64;
        tracing::info!(
            run_id,
            points = points.len(),
            documents = loads.len(),
            total_units = total,
            "starting run"
        );

        let semaphore = Arc::new(Semaphore::new(base.executor.max_concurrency.max(1)));
        let mut tasks: JoinSet<RunArtifact> = JoinSet::new();

        for (point, scorer) in points.iter().zip(scorers) {
            let config = Arc::new(point.config.clone());
            let point_id = point.sweep_point_id.clone();
            for load in &loads {
                tasks.spawn(run_unit(
                    Arc::clone(&self.provider),
                    Arc::clone(&self.registry),
                    Arc::clone(&config),
                    Arc::clone(&scorer),
                    Arc::clone(&semaphore),
                    run_id.to_string(),
                    point_id.clone(),
                    Arc::clone(load),
                ));
            }
        }

        let mut completed = 0u64;
        while let Some(artifact) = tasks.join_next().await {
            let artifact = artifact?;
            aggregator.record(&artifact)?;
            completed += 1;
            if let Some(on_progress) = &self.on_progress {
                on_progress(completed, total);
            }
        }

        aggregator.finalize()
    }

    /// Resolve everything a unit will need, so configuration mistakes abort
    /// the run before the first provider call.
    fn preflight(&self, points: &[RunConfig]) -> Result<Vec<Arc<dyn Scorer>>, PipelineError> {
        if points.is_empty() {
            return Err(PipelineError::InvalidRunConfig(
                "no sweep points to execute".into(),
            ));
        }

        let mut scorers = Vec::with_capacity(points.len());
        for point in points {
            for role in StageRole::ALL {
                let schema = point.config.stage(role).schema_for(role);
                self.registry.resolve(schema)?;
            }
            scorers.push(Arc::from(scorer_by_name(&point.config.result.scorer)?));
        }
        Ok(scorers)
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_unit<P: Provider>(
    provider: Arc<P>,
    registry: Arc<SchemaRegistry>,
    config: Arc<SynthexConfig>,
    scorer: Arc<dyn Scorer>,
    semaphore: Arc<Semaphore>,
    run_id: String,
    sweep_point_id: Option<String>,
    load: Arc<PaperLoad>,
) -> RunArtifact {
    // Closing the semaphore would be a bug; it lives as long as the run.
    let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
    let started_at = Utc::now();

    let stages = match &*load {
        PaperLoad::Loaded(paper) => {
            StageChain::new(&*provider, &registry, &config)
                .run(paper)
                .await
        }
        PaperLoad::Failed { detail, .. } => load_failure_stages(detail),
    };

    let score = stages
        .iter()
        .all(StageResult::is_success)
        .then(|| scorer.score(&stages))
        .flatten();

    RunArtifact {
        run_id,
        sweep_point_id,
        document_id: load.id().to_string(),
        stages,
        score,
        started_at,
        completed_at: Utc::now(),
    }
}

/// Stage entries for a document that never loaded: the first role carries
/// the load failure, the rest are skipped.
fn load_failure_stages(detail: &str) -> Vec<StageResult> {
    StageRole::ALL
        .iter()
        .enumerate()
        .map(|(idx, role)| {
            if idx == 0 {
                StageResult::failure(role.as_str(), FailureKind::Load, 0, detail)
            } else {
                StageResult::skipped(role.as_str())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use syx_config::{Composer, ResultConfig};
    use syx_llm::StubProvider;

    use super::*;
    use crate::testutil::fully_scripted_stub;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn base_config(data_dir: &Path, run_dir: &Path) -> SynthexConfig {
        SynthexConfig {
            data: syx_config::DataConfig {
                data_dir: data_dir.display().to_string(),
                ..syx_config::DataConfig::default()
            },
            result: ResultConfig {
                run_dir: run_dir.display().to_string(),
                ..ResultConfig::default()
            },
            ..SynthexConfig::default()
        }
    }

    fn single_point(config: SynthexConfig) -> Vec<RunConfig> {
        Composer::new(config)
            .compose()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn executor(stub: StubProvider) -> Executor<StubProvider> {
        Executor::new(Arc::new(stub), Arc::new(SchemaRegistry::new()))
    }

    #[tokio::test]
    async fn single_run_produces_one_artifact_per_document() {
        let data = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        write(data.path(), "alpha.txt", "alpha body");
        write(data.path(), "beta.txt", "beta body");

        let summary = executor(fully_scripted_stub())
            .execute("run-1", single_point(base_config(data.path(), results.path())))
            .await
            .unwrap();

        assert_eq!(summary.total_units, 2);
        assert_eq!(summary.succeeded_units, 2);
        assert!(summary.mean_score.is_some());
        assert!(results.path().join("run-1/alpha.json").exists());
        assert!(results.path().join("run-1/beta.json").exists());
        assert!(results.path().join("run-1/summary.json").exists());
    }

    #[tokio::test]
    async fn sweep_keys_artifacts_by_point_and_document() {
        let data = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        write(data.path(), "alpha.txt", "alpha body");
        write(data.path(), "beta.txt", "beta body");

        let mut composer = Composer::new(base_config(data.path(), results.path()));
        composer
            .parse_assignment("judge.model=gpt-4o-mini,gpt-4o")
            .unwrap();
        let points: Vec<RunConfig> = composer
            .compose()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let summary = executor(fully_scripted_stub())
            .execute("run-1", points)
            .await
            .unwrap();

        assert_eq!(summary.total_units, 4);
        for point in ["point-000", "point-001"] {
            for doc in ["alpha", "beta"] {
                assert!(
                    results.path().join("run-1").join(point).join(format!("{doc}.json")).exists(),
                    "missing artifact for {point}/{doc}"
                );
            }
        }
    }

    #[tokio::test]
    async fn unreadable_document_is_a_load_failure_not_an_abort() {
        let data = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        write(data.path(), "alpha.txt", "alpha body");
        // A directory with a .txt name enumerates but cannot be read.
        std::fs::create_dir(data.path().join("broken.txt")).unwrap();

        let summary = executor(fully_scripted_stub())
            .execute("run-1", single_point(base_config(data.path(), results.path())))
            .await
            .unwrap();

        assert_eq!(summary.total_units, 2);
        assert_eq!(summary.succeeded_units, 1);
        assert_eq!(summary.failure_histogram.get("load"), Some(&1));

        let broken: RunArtifact = serde_json::from_slice(
            &std::fs::read(results.path().join("run-1/broken.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(broken.stages[0].failure_kind(), Some(FailureKind::Load));
        assert!(broken.stages[1..].iter().all(|s| !s.is_success()));
    }

    #[tokio::test]
    async fn unknown_scorer_aborts_before_any_provider_call() {
        let data = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        write(data.path(), "alpha.txt", "alpha body");

        let mut config = base_config(data.path(), results.path());
        config.result.scorer = "bleu".into();

        let stub = fully_scripted_stub();
        let err = executor(stub)
            .execute("run-1", single_point(config))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidRunConfig(_)));
        assert!(!results.path().join("run-1").exists());
    }

    #[tokio::test]
    async fn empty_point_list_is_rejected() {
        let err = executor(fully_scripted_stub())
            .execute("run-1", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRunConfig(_)));
    }

    #[tokio::test]
    async fn unknown_schema_fails_preflight() {
        let data = tempfile::tempdir().unwrap();
        let results = tempfile::tempdir().unwrap();
        write(data.path(), "alpha.txt", "alpha body");

        let mut config = base_config(data.path(), results.path());
        config.judge.schema = "no_such_schema".into();

        let err = executor(fully_scripted_stub())
            .execute("run-1", single_point(config))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }
}
