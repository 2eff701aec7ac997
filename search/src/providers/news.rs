//! Serper.dev news-search adapter
//!
//! Same API family as the web adapter, but results come from the `news`
//! array and carry a publication date and outlet.

use async_trait::async_trait;
use serde::Deserialize;

use super::serper::SerperClient;
use super::SearchProvider;
use crate::config::SerperConfig;
use crate::error::SearchError;
use crate::types::{attach_images, SearchResponse, SearchResult, UNTITLED};

const PROVIDER: &str = "news";

/// Serper.dev news search
pub struct NewsProvider {
    serper: SerperClient,
}

impl NewsProvider {
    pub fn new(client: reqwest::Client, config: SerperConfig) -> Self {
        Self {
            serper: SerperClient::new(client, config),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SerperNewsPayload {
    news: Option<Vec<SerperNewsItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SerperNewsItem {
    pub(crate) title: Option<String>,
    pub(crate) link: Option<String>,
    pub(crate) snippet: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) date: Option<String>,
    pub(crate) source: Option<String>,
}

#[async_trait]
impl SearchProvider for NewsProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let (payload, images) = tokio::try_join!(
            async {
                let response = self.serper.query(PROVIDER, "news", query).await?;
                response
                    .json::<SerperNewsPayload>()
                    .await
                    .map_err(SearchError::http(PROVIDER))
            },
            self.serper.images(PROVIDER, query),
        )?;

        let news = payload.news.ok_or(SearchError::InvalidResponse {
            provider: PROVIDER,
            detail: "missing news results array".to_string(),
        })?;

        let mut results = normalize_news(news);
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

pub(crate) fn normalize_news(news: Vec<SerperNewsItem>) -> Vec<SearchResult> {
    news.into_iter()
        .filter_map(|item| {
            let url = item.link?;
            let summary = item.snippet.or(item.description).unwrap_or_default();
            Some(SearchResult {
                title: item.title.unwrap_or_else(|| UNTITLED.to_string()),
                content: summary.clone(),
                url,
                snippet: Some(summary),
                date: Some(item.date.unwrap_or_default()),
                source: Some(item.source.unwrap_or_default()),
                ..Default::default()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn news_results_carry_date_and_source() {
        let payload: SerperNewsPayload = serde_json::from_value(serde_json::json!({
            "news": [
                {
                    "title": "Headline",
                    "link": "https://news.example/a",
                    "snippet": "Summary",
                    "date": "2 hours ago",
                    "source": "Example Times"
                },
                { "link": "https://news.example/b" }
            ]
        }))
        .unwrap();

        let results = normalize_news(payload.news.unwrap());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].date.as_deref(), Some("2 hours ago"));
        assert_eq!(results[0].source.as_deref(), Some("Example Times"));
        // missing fields become empty strings, matching the response shape
        assert_eq!(results[1].title, "Untitled");
        assert_eq!(results[1].date.as_deref(), Some(""));
    }
}
