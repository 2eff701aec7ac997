//! Process configuration
//!
//! Credentials and endpoints are read from the environment once at
//! startup and never mutated. A search provider with a missing key is
//! not registered; chat requires at least one backend credential or the
//! process refuses to start.

use std::time::Duration;

use crate::chat::ChatBackend;

pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/chat/completions";
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Whole-request ceiling for one completion stream, connect through the
/// last body byte
pub const CHAT_MAX_DURATION: Duration = Duration::from_secs(60);

/// One chat-completion backend: endpoint plus optional credential
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: Option<String>,
}

/// Configuration for all three completion backends
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub deepseek: BackendConfig,
    pub openai: BackendConfig,
    pub groq: BackendConfig,
}

impl ChatConfig {
    /// Load from the environment. Blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            deepseek: BackendConfig {
                url: DEEPSEEK_API_URL.to_string(),
                api_key: env_key("DEEPSEEK_API_KEY"),
            },
            openai: BackendConfig {
                url: OPENAI_API_URL.to_string(),
                api_key: env_key("OPENAI_API_KEY"),
            },
            groq: BackendConfig {
                url: GROQ_API_URL.to_string(),
                api_key: env_key("GROQ_API_KEY"),
            },
        }
    }

    pub fn backend(&self, backend: ChatBackend) -> &BackendConfig {
        match backend {
            ChatBackend::DeepSeek => &self.deepseek,
            ChatBackend::OpenAi => &self.openai,
            ChatBackend::Groq => &self.groq,
        }
    }

    /// True when at least one backend has a credential
    pub fn any_available(&self) -> bool {
        [&self.deepseek, &self.openai, &self.groq]
            .iter()
            .any(|backend| backend.api_key.is_some())
    }

    /// Labels of the backends that can actually be used
    pub fn available_backends(&self) -> Vec<&'static str> {
        [
            (ChatBackend::DeepSeek, &self.deepseek),
            (ChatBackend::OpenAi, &self.openai),
            (ChatBackend::Groq, &self.groq),
        ]
        .into_iter()
        .filter(|(_, config)| config.api_key.is_some())
        .map(|(backend, _)| backend.label())
        .collect()
    }

    /// Environment variables that are unset. Reported once at startup.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.deepseek.api_key.is_none() {
            missing.push("DEEPSEEK_API_KEY");
        }
        if self.openai.api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if self.groq.api_key.is_none() {
            missing.push("GROQ_API_KEY");
        }
        missing
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
