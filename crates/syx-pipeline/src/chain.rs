//! The fixed extraction chain for one document.
//!
//! Stages run strictly in [`StageRole::ALL`] order. The first stage failure
//! halts the chain and every later role is recorded as skipped, so an
//! artifact always carries one entry per role. An optional chain deadline
//! caps the whole document; the stage in flight when it expires fails with
//! [`FailureKind::Timeout`].

use std::time::Duration;

use syx_config::{StageRole, SynthexConfig};
use syx_core::artifact::{FailureKind, StageResult};
use syx_core::paper::Paper;
use syx_llm::Provider;
use syx_schema::SchemaRegistry;
use tokio::time::Instant;

use crate::stage::ExtractionStage;

/// Runs the full role chain for single documents.
pub struct StageChain<'a, P> {
    provider: &'a P,
    registry: &'a SchemaRegistry,
    config: &'a SynthexConfig,
}

impl<'a, P: Provider> StageChain<'a, P> {
    #[must_use]
    pub fn new(provider: &'a P, registry: &'a SchemaRegistry, config: &'a SynthexConfig) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    /// Run every role against `paper`, in chain order.
    ///
    /// The returned vector has exactly one [`StageResult`] per role.
    pub async fn run(&self, paper: &Paper) -> Vec<StageResult> {
        let deadline_secs = self.config.executor.deadline_secs;
        let deadline = deadline_secs.map(|secs| Instant::now() + Duration::from_secs(secs));

        let stage = ExtractionStage::new(
            self.provider,
            self.registry,
            self.config.executor.max_attempts,
        );

        let mut results: Vec<StageResult> = Vec::with_capacity(StageRole::ALL.len());
        let mut halted = false;

        for role in StageRole::ALL {
            if halted {
                results.push(StageResult::skipped(role.as_str()));
                continue;
            }

            let run = stage.run(role, self.config.stage(role), paper, &results);
            let result = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match tokio::time::timeout(remaining, run).await {
                        Ok(result) => result,
                        Err(_) => StageResult::failure(
                            role.as_str(),
                            FailureKind::Timeout,
                            0,
                            format!(
                                "chain deadline of {}s expired",
                                deadline_secs.unwrap_or_default()
                            ),
                        ),
                    }
                }
                None => run.await,
            };

            if !result.is_success() {
                tracing::info!(
                    document = %paper.id,
                    stage = role.as_str(),
                    kind = ?result.failure_kind(),
                    "chain halted"
                );
                halted = true;
            }
            results.push(result);
        }

        results
    }
}
