//! Serper.dev scholarly-search adapter
//!
//! Results come from the scholar endpoint's `organic` array and carry
//! publication metadata: date, venue, citation count, and authors.

use async_trait::async_trait;
use serde::Deserialize;

use super::serper::SerperClient;
use super::SearchProvider;
use crate::config::SerperConfig;
use crate::error::SearchError;
use crate::types::{attach_images, SearchResponse, SearchResult, UNTITLED};

const PROVIDER: &str = "scholar";

/// Serper.dev scholar search
pub struct ScholarProvider {
    serper: SerperClient,
}

impl ScholarProvider {
    pub fn new(client: reqwest::Client, config: SerperConfig) -> Self {
        Self {
            serper: SerperClient::new(client, config),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SerperScholarPayload {
    organic: Option<Vec<SerperScholarItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SerperScholarItem {
    pub(crate) title: Option<String>,
    pub(crate) link: Option<String>,
    pub(crate) snippet: Option<String>,
    pub(crate) description: Option<String>,
    #[serde(rename = "publicationDate")]
    pub(crate) publication_date: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) citations: Option<u64>,
    pub(crate) authors: Option<Vec<String>>,
}

#[async_trait]
impl SearchProvider for ScholarProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let (payload, images) = tokio::try_join!(
            async {
                let response = self.serper.query(PROVIDER, "scholar", query).await?;
                response
                    .json::<SerperScholarPayload>()
                    .await
                    .map_err(SearchError::http(PROVIDER))
            },
            self.serper.images(PROVIDER, query),
        )?;

        let organic = payload.organic.ok_or(SearchError::InvalidResponse {
            provider: PROVIDER,
            detail: "missing organic results array".to_string(),
        })?;

        let mut results = normalize_scholar(organic);
        if results.is_empty() {
            return Err(SearchError::NoResults);
        }
        attach_images(&mut results, &images);

        Ok(SearchResponse {
            results,
            images,
            answer: None,
        })
    }
}

pub(crate) fn normalize_scholar(organic: Vec<SerperScholarItem>) -> Vec<SearchResult> {
    organic
        .into_iter()
        .filter_map(|item| {
            let url = item.link?;
            let summary = item.snippet.or(item.description).unwrap_or_default();
            Some(SearchResult {
                title: item.title.unwrap_or_else(|| UNTITLED.to_string()),
                content: summary.clone(),
                url,
                snippet: Some(summary),
                date: Some(item.publication_date.unwrap_or_default()),
                source: Some(item.source.unwrap_or_default()),
                citations: Some(item.citations.unwrap_or(0)),
                authors: Some(item.authors.unwrap_or_default()),
                ..Default::default()
            })
        })
        .collect()
}
