//! # syx-llm
//!
//! LLM provider clients for Synthex.
//!
//! The pipeline talks to providers only through the [`Provider`] trait: a raw
//! prompt in, raw text out, with a transient-vs-fatal error distinction the
//! retry loop honors. Implementations:
//! - [`OpenAiCompatClient`]: any OpenAI-compatible chat-completions endpoint,
//!   with a [`ModelRegistry`] mapping short model names to endpoints
//! - [`StubProvider`]: scripted responses for tests and dry runs
//!
//! [`parse::extract_json`] recovers JSON objects from prose-wrapped model
//! output before the pipeline validates them.

mod error;
mod models;
mod openai;
pub mod parse;
mod stub;

pub use error::ProviderError;
pub use models::{ModelRegistry, ModelSpec};
pub use openai::OpenAiCompatClient;
pub use stub::{StubProvider, StubResponse};

/// One delegated provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Stage role making the call. Recorded in provenance; the stub provider
    /// also dispatches its scripts on it.
    pub stage: String,
    /// Short model name, resolved through the model registry.
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

/// A black-box LLM backend: prompt in, raw text out.
///
/// Implementations must be shareable across concurrent chains; all state is
/// interior and call-scoped.
pub trait Provider: Send + Sync {
    /// Run one completion call.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}
