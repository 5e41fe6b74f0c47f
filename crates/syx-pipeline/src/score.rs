//! Run-level scoring of completed chains.
//!
//! A scorer turns a fully successful chain into a single comparable number
//! for sweep analysis. Without gold-standard references the choices are a
//! random placeholder (keeps the aggregation path exercised end to end) and
//! the judge's own overall score.

use rand::Rng;
use syx_config::StageRole;
use syx_core::artifact::StageResult;

use crate::error::PipelineError;
use crate::prompts;

/// Assigns a score to the stage results of one completed chain.
pub trait Scorer: Send + Sync + std::fmt::Debug {
    /// Configuration name of this scorer.
    fn name(&self) -> &'static str;

    /// Score a chain where every stage succeeded. `None` when the inputs the
    /// scorer needs are missing.
    fn score(&self, stages: &[StageResult]) -> Option<f64>;
}

/// Placeholder metric: a uniform draw from [0, 1).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomScorer;

impl Scorer for RandomScorer {
    fn name(&self) -> &'static str {
        "random"
    }

    fn score(&self, _stages: &[StageResult]) -> Option<f64> {
        Some(rand::rng().random_range(0.0..1.0))
    }
}

/// Reads the judge stage's `overall_score` out of its validated record.
#[derive(Debug, Default, Clone, Copy)]
pub struct JudgeScorer;

impl Scorer for JudgeScorer {
    fn name(&self) -> &'static str {
        "judge"
    }

    fn score(&self, stages: &[StageResult]) -> Option<f64> {
        prompts::prior_value(stages, StageRole::Judge)?
            .pointer("/scores/overall_score")?
            .as_f64()
    }
}

/// Resolve a scorer by its configuration name.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidRunConfig`] for unknown names. Called in
/// preflight so a typo aborts the run before any unit is scheduled.
pub fn scorer_by_name(name: &str) -> Result<Box<dyn Scorer>, PipelineError> {
    match name {
        "random" => Ok(Box::new(RandomScorer)),
        "judge" => Ok(Box::new(JudgeScorer)),
        other => Err(PipelineError::InvalidRunConfig(format!(
            "unknown scorer '{other}' (expected 'random' or 'judge')"
        ))),
    }
}
