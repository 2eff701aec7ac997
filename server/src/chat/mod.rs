//! Streaming chat-completion proxy
//!
//! Selects one of three upstream backends by model name, issues a single
//! streaming request, and hands the response body to the re-framing
//! layer in [`stream`].

pub mod stream;
pub mod types;

use serde_json::json;
use thiserror::Error;

use crate::config::ChatConfig;
use types::ChatMessage;

/// Upstream chat-completion backend families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatBackend {
    DeepSeek,
    OpenAi,
    Groq,
}

impl ChatBackend {
    /// Pick the backend for a model identifier. Pure: the same name
    /// always selects the same backend, with no fallback probing.
    pub fn for_model(model: &str) -> Self {
        if model.starts_with("gpt-") {
            Self::OpenAi
        } else if model.contains("deepseek-r1") {
            Self::Groq
        } else {
            Self::DeepSeek
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DeepSeek",
            Self::OpenAi => "OpenAI",
            Self::Groq => "Groq",
        }
    }
}

/// Models whose deltas carry chain-of-thought tokens that belong on the
/// reasoning channel
pub fn is_reasoning_model(model: &str) -> bool {
    matches!(model, "deepseek-reasoner" | "deepseek-r1-distill-llama-70b")
}

/// Errors from the completion proxy
#[derive(Debug, Error)]
pub enum ChatError {
    /// The selected backend has no credential configured
    #[error("API key not found for {0}")]
    MissingCredential(&'static str),

    /// The upstream answered with a non-success status
    #[error("{backend} request failed (status {status}): {message}")]
    Upstream {
        backend: &'static str,
        status: u16,
        message: String,
    },

    /// The request never completed (connect, timeout)
    #[error("{backend} request error: {source}")]
    Http {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Open the upstream stream for one completion request.
///
/// Fails before any network call when the selected backend has no
/// credential. The caller's HTTP client carries the whole-request
/// duration ceiling.
pub async fn open_stream(
    client: &reqwest::Client,
    config: &ChatConfig,
    model: &str,
    messages: &[ChatMessage],
) -> Result<reqwest::Response, ChatError> {
    let backend = ChatBackend::for_model(model);
    let backend_config = config.backend(backend);
    let api_key = backend_config
        .api_key
        .as_deref()
        .ok_or(ChatError::MissingCredential(backend.label()))?;

    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": 0.7,
        "stream": true,
    });
    // Only the Groq variant takes an explicit token budget
    if backend == ChatBackend::Groq {
        body["max_tokens"] = json!(8000);
    }

    let response = client
        .post(&backend_config.url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|source| ChatError::Http {
            backend: backend.label(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let message = upstream_error_message(response)
            .await
            .unwrap_or_else(|| format!("failed to get response from {}", backend.label()));
        return Err(ChatError::Upstream {
            backend: backend.label(),
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

/// Pull the upstream's own error message out of a failure body when
/// present (`message` at the top level, or nested under `error`)
async fn upstream_error_message(response: reqwest::Response) -> Option<String> {
    let body: serde_json::Value = response.json().await.ok()?;
    body.get("message")
        .or_else(|| body.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
