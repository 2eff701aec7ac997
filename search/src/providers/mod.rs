//! Search provider implementations
//!
//! This module provides a trait-based abstraction for search providers
//! and the name-keyed registry the HTTP layer dispatches through. Adding
//! a provider means registering one new entry, not branching existing
//! code.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::SearchResponse;

pub mod bing;
pub mod duckduckgo;
pub mod mojeek;
pub mod news;
pub mod scholar;
pub mod serper;

/// Trait for search provider adapters
///
/// All providers must implement this trait to provide a consistent
/// interface for the registry and the HTTP layer.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Registry name; also the route segment this provider is served under
    fn name(&self) -> &'static str;

    /// Run one search and normalize the upstream payload into the common
    /// response shape
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError>;
}

/// Name → adapter registry
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn SearchProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration, registering only the providers
    /// whose credentials are present. The scrape fallback needs none and
    /// is always registered.
    pub fn from_config(config: &SearchConfig, client: reqwest::Client) -> Self {
        let mut registry = Self::new();

        if let Some(serper) = &config.serper {
            registry.register(Arc::new(serper::SerperProvider::new(
                client.clone(),
                serper.clone(),
            )));
            registry.register(Arc::new(news::NewsProvider::new(
                client.clone(),
                serper.clone(),
            )));
            registry.register(Arc::new(scholar::ScholarProvider::new(
                client.clone(),
                serper.clone(),
            )));
        }
        if let Some(bing) = &config.bing {
            registry.register(Arc::new(bing::BingProvider::new(client.clone(), bing.clone())));
        }
        if let Some(mojeek) = &config.mojeek {
            registry.register(Arc::new(mojeek::MojeekProvider::new(
                client.clone(),
                mojeek.clone(),
            )));
        }
        registry.register(Arc::new(duckduckgo::DuckDuckGoProvider::new(
            client,
            config.duckduckgo.clone(),
        )));

        registry
    }

    pub fn register(&mut self, provider: Arc<dyn SearchProvider>) {
        self.providers.insert(provider.name(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SearchProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names, sorted for stable route and health output
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.providers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Validate the query and dispatch to exactly one adapter.
    ///
    /// The empty-query check runs before any adapter code, so a bad
    /// request never costs an upstream call.
    pub async fn dispatch(&self, name: &str, query: &str) -> Result<SearchResponse, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let provider = self
            .get(name)
            .ok_or_else(|| SearchError::UnknownProvider(name.to_string()))?;
        provider.search(query).await
    }
}
