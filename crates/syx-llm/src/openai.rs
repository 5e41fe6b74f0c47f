//! OpenAI-compatible chat-completions client.
//!
//! One client serves every registry model: the request carries the short
//! model name and the client resolves endpoint, key, and provider-side model
//! identifier per call, so a sweep over models needs no client rebuilds.
//!
//! Failure statuses are mapped here too: 429 becomes
//! [`ProviderError::RateLimited`] with the provider's `Retry-After` backoff,
//! and other non-success statuses become [`ProviderError::Api`] carrying the
//! message from the OpenAI/Mistral error envelope.

use serde::{Deserialize, Serialize};

use crate::{CompletionRequest, Provider, error::ProviderError, models::ModelRegistry};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Error body shape shared by OpenAI and Mistral:
/// `{"error": {"message": ..., "type": ...}}`.
#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for any OpenAI-compatible chat-completions endpoint.
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    registry: ModelRegistry,
}

impl OpenAiCompatClient {
    /// Create a client over the built-in model registry.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build, which only
    /// happens when the TLS backend cannot initialize.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(ModelRegistry::new())
    }

    /// Create a client over a caller-supplied model registry.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn with_registry(registry: ModelRegistry) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("synthex/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client should build");
        Self { http, registry }
    }

    fn api_key(env_name: &str) -> Result<String, ProviderError> {
        std::env::var(env_name).map_err(|_| ProviderError::MissingApiKey {
            env: env_name.to_string(),
        })
    }
}

impl Default for OpenAiCompatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let spec = self.registry.resolve(&request.model)?;
        let api_key = Self::api_key(&spec.api_key_env)?;

        let body = ChatRequest {
            model: &spec.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", spec.api_base.trim_end_matches('/'));
        tracing::debug!(stage = %request.stage, model = %spec.model, "provider call");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after_secs(&resp),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Envelope(e.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Envelope("response contained no choices".to_string()))
    }
}

/// Backoff seconds for a 429, from the provider's `Retry-After` header. Both
/// OpenAI and Mistral send plain seconds; anything else falls back to 60.
fn retry_after_secs(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(60)
}

/// Message from the provider error envelope, or the raw body when the
/// response is not the expected JSON shape (proxies, HTML error pages).
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.to_string(),
    }
}
