//! Shared application state

use std::sync::Arc;

use farsight_search::ProviderRegistry;

use crate::config::{ChatConfig, CHAT_MAX_DURATION};

/// State shared by every request handler. Everything here is read-only
/// after startup; requests never share mutable state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub chat: Arc<ChatConfig>,
    /// Client used for completion requests; carries the whole-request
    /// duration ceiling
    pub chat_client: reqwest::Client,
}

impl AppState {
    pub fn new(registry: ProviderRegistry, chat: ChatConfig) -> anyhow::Result<Self> {
        let chat_client = reqwest::Client::builder()
            .timeout(CHAT_MAX_DURATION)
            .build()?;

        Ok(Self {
            registry: Arc::new(registry),
            chat: Arc::new(chat),
            chat_client,
        })
    }
}
