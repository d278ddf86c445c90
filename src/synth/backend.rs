//! Generation backends and the fallback chain.
//!
//! A backend turns a [`GenerationRequest`] into raw text for one model id.
//! The chain orders model ids from preferred to last resort; the
//! synthesizer walks it until an attempt produces an acceptable message.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BackendError;
use crate::synth::prompt::GenerationRequest;

/// Hard ceiling per backend attempt. A slow backend must not stall the
/// whole chain.
pub const GENERATION_TIMEOUT_SECS: u64 = 15;

/// Models tried after the configured primary, in order.
pub const FALLBACK_MODELS: [&str; 3] = [
    "openai/gpt-4o-mini",
    "openai/gpt-3.5-turbo",
    "anthropic/claude-3-haiku",
];

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// A single text-generation backend.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, BackendError>;
}

/// Ordered list of model ids to try.
#[derive(Debug, Clone)]
pub struct BackendChain {
    models: Vec<String>,
}

impl BackendChain {
    /// Build the chain from the configured primary model. Fallbacks are
    /// appended after it; a primary that duplicates a fallback is not
    /// tried twice.
    pub fn new(primary: &str) -> Self {
        let mut models = vec![primary.to_string()];
        for fallback in FALLBACK_MODELS {
            if fallback != primary {
                models.push(fallback.to_string());
            }
        }
        BackendChain { models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
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
    content: String,
}

/// OpenRouter-backed implementation of [`GenerationBackend`].
///
/// One client serves every model in the chain; OpenRouter routes by the
/// model id in the request body.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    site_url: String,
    site_name: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, site_url: String, site_name: String) -> Self {
        OpenRouterClient {
            http: reqwest::Client::new(),
            api_key,
            site_url,
            site_name,
        }
    }

    async fn send(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, BackendError> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: 0.9,
        };

        let response = self
            .http
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.site_name)
            .json(&body)
            .send()
            .await
            .map_err(|source| BackendError::Request { model: model.to_string(), source })?;

        let response = response.error_for_status().map_err(|source| {
            BackendError::Request { model: model.to_string(), source }
        })?;

        let parsed: ChatResponse = response.json().await.map_err(|source| {
            BackendError::Request { model: model.to_string(), source }
        })?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(BackendError::InvalidResponse {
                model: model.to_string(),
                detail: "empty completion".to_string(),
            });
        }

        Ok(content)
    }
}

#[async_trait]
impl GenerationBackend for OpenRouterClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, BackendError> {
        debug!(model, "sending generation request");
        let deadline = Duration::from_secs(GENERATION_TIMEOUT_SECS);
        match tokio::time::timeout(deadline, self.send(model, request)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout {
                model: model.to_string(),
                seconds: GENERATION_TIMEOUT_SECS,
            }),
        }
    }
}
