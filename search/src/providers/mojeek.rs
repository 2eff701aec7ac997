//! Mojeek adapter
//!
//! Single JSON request; results arrive under a `response` envelope whose
//! `status` doubles as an account-health signal.

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;

use super::SearchProvider;
use crate::config::MojeekConfig;
use crate::error::SearchError;
use crate::types::{Image, SearchResponse, SearchResult, UNTITLED};

const PROVIDER: &str = "mojeek";
const RESULT_COUNT: &str = "20";

/// Mojeek Search API adapter
pub struct MojeekProvider {
    client: reqwest::Client,
    config: MojeekConfig,
}

impl MojeekProvider {
    pub fn new(client: reqwest::Client, config: MojeekConfig) -> Self {
        Self { client, config }
    }
}

// Mojeek API response types

#[derive(Debug, Deserialize)]
struct MojeekPayload {
    response: Option<MojeekEnvelope>,
}

#[derive(Debug, Deserialize)]
struct MojeekEnvelope {
    status: Option<String>,
    results: Option<Vec<MojeekResult>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MojeekResult {
    pub(crate) title: Option<String>,
    pub(crate) desc: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) image: Option<MojeekImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MojeekImage {
    pub(crate) url: String,
}

#[async_trait]
impl SearchProvider for MojeekProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let url = format!("{}/search", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("q", query),
                ("t", RESULT_COUNT),
                ("fmt", "json"),
            ])
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(SearchError::http(PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Upstream {
                provider: PROVIDER,
                status: status.as_u16(),
                message: "failed to fetch search results".to_string(),
            });
        }

        let payload: MojeekPayload = response
            .json()
            .await
            .map_err(SearchError::http(PROVIDER))?;

        let envelope = payload.response.ok_or(SearchError::InvalidResponse {
            provider: PROVIDER,
            detail: "missing response envelope".to_string(),
        })?;

        // An exhausted or disabled API key still comes back as HTTP 200
        if envelope
            .status
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains("access denied"))
        {
            return Err(SearchError::Upstream {
                provider: PROVIDER,
                status: status.as_u16(),
                message: "search service temporarily unavailable".to_string(),
            });
        }

        let raw_results = envelope.results.ok_or(SearchError::InvalidResponse {
            provider: PROVIDER,
            detail: "missing results array".to_string(),
        })?;
        if raw_results.is_empty() {
            return Err(SearchError::NoResults);
        }

        let (results, images) = normalize_results(raw_results);
        if results.is_empty() {
            return Err(SearchError::NoResults);
        }

        Ok(SearchResponse {
            results,
            images,
            answer: None,
        })
    }
}

pub(crate) fn normalize_results(raw: Vec<MojeekResult>) -> (Vec<SearchResult>, Vec<Image>) {
    let mut results = Vec::with_capacity(raw.len());
    let mut images = Vec::new();

    for result in raw {
        let Some(url) = result.url else { continue };
        // Image caption comes from the raw title before the Untitled
        // fallback is applied
        let image = result.image.map(|img| Image {
            url: img.url,
            description: result
                .title
                .clone()
                .unwrap_or_else(|| "Search result image".to_string()),
        });
        if let Some(image) = &image {
            images.push(image.clone());
        }

        let desc = result.desc.unwrap_or_default();
        results.push(SearchResult {
            title: result.title.unwrap_or_else(|| UNTITLED.to_string()),
            content: desc.clone(),
            url,
            snippet: Some(desc),
            image,
            ..Default::default()
        });
    }

    (results, images)
}
