//! Serper.dev web-search adapter
//!
//! Also hosts the POST client and image normalization shared with the
//! news and scholar adapters, which hit sibling endpoints of the same
//! API with the same key.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::SearchProvider;
use crate::config::SerperConfig;
use crate::error::SearchError;
use crate::types::{attach_images, Image, SearchResponse, SearchResult, UNTITLED};

const PROVIDER: &str = "serper";
const RESULT_COUNT: u32 = 10;

/// Shared client for the Serper endpoint family
pub(crate) struct SerperClient {
    client: reqwest::Client,
    config: SerperConfig,
}

impl SerperClient {
    pub(crate) fn new(client: reqwest::Client, config: SerperConfig) -> Self {
        Self { client, config }
    }

    /// POST one Serper endpoint with the fixed locale parameters
    pub(crate) async fn query(
        &self,
        provider: &'static str,
        endpoint: &str,
        query: &str,
    ) -> Result<reqwest::Response, SearchError> {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.config.api_key)
            .json(&json!({
                "q": query,
                "num": RESULT_COUNT,
                "gl": "us",
                "hl": "en",
            }))
            .send()
            .await
            .map_err(SearchError::http(provider))?;

        let status = response.status();
        if !status.is_success() {
            let message = upstream_message(response).await;
            return Err(SearchError::Upstream {
                provider,
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Fetch and normalize the images endpoint; every Serper-family
    /// adapter pairs its text results with this call.
    pub(crate) async fn images(
        &self,
        provider: &'static str,
        query: &str,
    ) -> Result<Vec<Image>, SearchError> {
        let response = self.query(provider, "images", query).await?;
        let payload: SerperImagesPayload = response
            .json()
            .await
            .map_err(SearchError::http(provider))?;
        Ok(normalize_images(payload))
    }
}

/// Pull the upstream `message` field out of an error body when present
pub(crate) async fn upstream_message(response: reqwest::Response) -> String {
    match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => "request failed".to_string(),
    }
}

// Serper API response types

#[derive(Debug, Deserialize)]
pub(crate) struct SerperWebPayload {
    organic: Option<Vec<SerperOrganic>>,
    #[serde(rename = "answerBox")]
    answer_box: Option<SerperAnswerBox>,
    #[serde(rename = "knowledgeGraph")]
    knowledge_graph: Option<SerperKnowledgeGraph>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SerperOrganic {
    pub(crate) title: Option<String>,
    pub(crate) link: Option<String>,
    pub(crate) snippet: Option<String>,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerperAnswerBox {
    answer: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerperKnowledgeGraph {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SerperImagesPayload {
    #[serde(default)]
    images: Vec<SerperImage>,
}

#[derive(Debug, Deserialize)]
struct SerperImage {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
    title: Option<String>,
}

/// Serper.dev generic web search
pub struct SerperProvider {
    serper: SerperClient,
}

impl SerperProvider {
    pub fn new(client: reqwest::Client, config: SerperConfig) -> Self {
        Self {
            serper: SerperClient::new(client, config),
        }
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        // Text and image lookups go out together; both must land before
        // the response is composed.
        let (web, images) = tokio::try_join!(
            async {
                let response = self.serper.query(PROVIDER, "search", query).await?;
                response
                    .json::<SerperWebPayload>()
                    .await
                    .map_err(SearchError::http(PROVIDER))
            },
            self.serper.images(PROVIDER, query),
        )?;

        let answer = extract_answer(&web);

        let organic = web.organic.ok_or(SearchError::InvalidResponse {
            provider: PROVIDER,
            detail: "missing organic results array".to_string(),
        })?;

        let mut results = normalize_organic(organic);
        if results.is_empty() {
            return Err(SearchError::NoResults);
        }
        attach_images(&mut results, &images);

        Ok(SearchResponse {
            results,
            images,
            answer,
        })
    }
}

pub(crate) fn normalize_organic(organic: Vec<SerperOrganic>) -> Vec<SearchResult> {
    organic
        .into_iter()
        .filter_map(|result| {
            let url = result.link?;
            let summary = result.snippet.or(result.description).unwrap_or_default();
            Some(SearchResult {
                title: result.title.unwrap_or_else(|| UNTITLED.to_string()),
                content: summary.clone(),
                url,
                snippet: Some(summary),
                ..Default::default()
            })
        })
        .collect()
}

pub(crate) fn normalize_images(payload: SerperImagesPayload) -> Vec<Image> {
    payload
        .images
        .into_iter()
        .filter_map(|image| {
            Some(Image {
                url: image.image_url?,
                description: image.title.unwrap_or_default(),
            })
        })
        .collect()
}

/// Answer precedence: answer box answer, then knowledge graph
/// description, then answer box snippet
fn extract_answer(payload: &SerperWebPayload) -> Option<String> {
    payload
        .answer_box
        .as_ref()
        .and_then(|b| b.answer.clone())
        .or_else(|| {
            payload
                .knowledge_graph
                .as_ref()
                .and_then(|k| k.description.clone())
        })
        .or_else(|| payload.answer_box.as_ref().and_then(|b| b.snippet.clone()))
        .filter(|answer| !answer.is_empty())
}
