//! Wire types for the completion proxy

use serde::{Deserialize, Serialize};

/// One conversation message, forwarded verbatim to the upstream backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Inbound request body for the chat route
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "deepseek-reasoner".to_string()
}

// Upstream chunk shape: only the fields the proxy reads; everything else
// in the payload is ignored.

#[derive(Debug, Deserialize)]
pub struct UpstreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<UpstreamChoice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpstreamChoice {
    #[serde(default)]
    pub delta: UpstreamDelta,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpstreamDelta {
    pub content: Option<String>,
}

/// One normalized event on the outbound newline-delimited stream
#[derive(Debug, Serialize)]
pub struct CompletionEvent {
    pub id: String,
    pub choices: Vec<EventChoice>,
}

#[derive(Debug, Serialize)]
pub struct EventChoice {
    pub delta: EventDelta,
}

#[derive(Debug, Serialize)]
pub struct EventDelta {
    pub content: String,
    /// Present (possibly empty) for reasoning-capable models, absent
    /// otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}
