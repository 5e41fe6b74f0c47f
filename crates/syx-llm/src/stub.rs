//! Scripted provider for tests and dry runs.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::{CompletionRequest, Provider, error::ProviderError};

/// One scripted reaction to a provider call.
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Return this raw text.
    Text(String),
    /// Fail with a transient error (503).
    Transient(String),
    /// Fail with a fatal error (400).
    Fatal(String),
}

/// Provider that replays scripted responses keyed by stage name.
///
/// Each stage's script is consumed front to back; the final entry repeats
/// forever, so "always returns X" scenarios need a single entry. Stages with
/// no script fail fatally, which makes forgotten scripts loud in tests.
#[derive(Debug, Default)]
pub struct StubProvider {
    scripts: Mutex<HashMap<String, VecDeque<StubResponse>>>,
    calls: Mutex<HashMap<String, u32>>,
}

impl StubProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a sequence of responses for one stage.
    #[must_use]
    pub fn with_script(
        self,
        stage: impl Into<String>,
        responses: impl IntoIterator<Item = StubResponse>,
    ) -> Self {
        self.scripts
            .lock()
            .expect("stub scripts lock")
            .insert(stage.into(), responses.into_iter().collect());
        self
    }

    /// Script a single text response that repeats for every attempt.
    #[must_use]
    pub fn with_text(self, stage: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_script(stage, [StubResponse::Text(text.into())])
    }

    /// Number of calls made for a stage so far.
    #[must_use]
    pub fn call_count(&self, stage: &str) -> u32 {
        self.calls
            .lock()
            .expect("stub calls lock")
            .get(stage)
            .copied()
            .unwrap_or(0)
    }
}

impl Provider for StubProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        *self
            .calls
            .lock()
            .expect("stub calls lock")
            .entry(request.stage.clone())
            .or_insert(0) += 1;

        let response = {
            let mut scripts = self.scripts.lock().expect("stub scripts lock");
            let Some(queue) = scripts.get_mut(&request.stage) else {
                return Err(ProviderError::Api {
                    status: 400,
                    message: format!("no stub script for stage '{}'", request.stage),
                });
            };
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        };

        match response {
            Some(StubResponse::Text(text)) => Ok(text),
            Some(StubResponse::Transient(message)) => Err(ProviderError::Api {
                status: 503,
                message,
            }),
            Some(StubResponse::Fatal(message)) => Err(ProviderError::Api {
                status: 400,
                message,
            }),
            None => Err(ProviderError::Api {
                status: 400,
                message: format!("empty stub script for stage '{}'", request.stage),
            }),
        }
    }
}
