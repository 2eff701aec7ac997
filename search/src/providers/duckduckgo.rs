//! DuckDuckGo HTML-scrape fallback
//!
//! No API key: web results come from parsing the HTML results mirror by
//! CSS selectors. Image search needs a session token (`vqd`) scraped out
//! of a script blob on the home page first; when the token cannot be
//! found, or any step of the image sequence fails, the search degrades
//! to an empty image list instead of failing.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use super::SearchProvider;
use crate::config::DuckDuckGoConfig;
use crate::error::SearchError;
use crate::types::{Image, SearchResponse, SearchResult};

const PROVIDER: &str = "duckduckgo";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_IMAGES: usize = 10;

static RESULT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__title").unwrap());
static URL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__url").unwrap());
static SNIPPET_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__snippet").unwrap());
static VQD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"vqd="([^"]+)""#).unwrap());

/// Scrape-based fallback provider
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    config: DuckDuckGoConfig,
}

impl DuckDuckGoProvider {
    pub fn new(client: reqwest::Client, config: DuckDuckGoConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_results_page(&self, query: &str) -> Result<String, SearchError> {
        let url = format!("{}/html/", self.config.html_base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .timeout(REQUEST_TIMEOUT)
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
        response.text().await.map_err(SearchError::http(PROVIDER))
    }

    /// Second, independent request sequence: home page for the session
    /// token, then the image endpoint. Errors propagate to the caller,
    /// which degrades them to an empty list.
    async fn fetch_images(&self, query: &str) -> Result<Vec<Image>, SearchError> {
        let home = self
            .client
            .get(format!("{}/", self.config.home_base_url))
            .query(&[("q", query)])
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(SearchError::http(PROVIDER))?
            .text()
            .await
            .map_err(SearchError::http(PROVIDER))?;

        let Some(vqd) = extract_vqd(&home) else {
            tracing::warn!(provider = PROVIDER, "vqd token not found on search page");
            return Ok(Vec::new());
        };

        let payload: DdgImagesPayload = self
            .client
            .get(format!("{}/i.js", self.config.home_base_url))
            .query(&[("q", query), ("vqd", &vqd), ("f", ",,,"), ("p", "1")])
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::ACCEPT, "application/json")
            .header(header::REFERER, format!("{}/", self.config.home_base_url))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(SearchError::http(PROVIDER))?
            .json()
            .await
            .map_err(SearchError::http(PROVIDER))?;

        Ok(normalize_images(payload))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DdgImagesPayload {
    #[serde(default)]
    results: Vec<DdgImageResult>,
}

#[derive(Debug, Deserialize)]
struct DdgImageResult {
    title: Option<String>,
    image: Option<String>,
    thumbnail: Option<String>,
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let html = self.fetch_results_page(query).await?;
        let results = parse_web_results(&html);
        if results.is_empty() {
            return Err(SearchError::NoResults);
        }

        // Token scraping depends on an unstable page internal; never let
        // it take down an otherwise good search.
        let images = match self.fetch_images(query).await {
            Ok(images) => images,
            Err(e) => {
                tracing::warn!(
                    provider = PROVIDER,
                    error = %e,
                    "image lookup failed, continuing without images"
                );
                Vec::new()
            }
        };

        Ok(SearchResponse {
            results,
            images,
            answer: None,
        })
    }
}

pub(crate) fn parse_web_results(html: &str) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for element in document.select(&RESULT_SELECTOR) {
        let title = first_text(element, &TITLE_SELECTOR);
        let link = first_text(element, &URL_SELECTOR);
        let snippet = first_text(element, &SNIPPET_SELECTOR);

        // An element missing either piece is navigation chrome, not a result
        if title.is_empty() || link.is_empty() {
            continue;
        }

        let url = if link.starts_with("http") {
            link
        } else {
            format!("https://{link}")
        };
        let summary = if snippet.is_empty() { title.clone() } else { snippet };

        results.push(SearchResult {
            title,
            content: summary.clone(),
            url,
            snippet: Some(summary),
            ..Default::default()
        });
    }

    results
}

fn first_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join("").trim().to_string())
        .unwrap_or_default()
}

pub(crate) fn extract_vqd(html: &str) -> Option<String> {
    VQD_RE.captures(html).map(|captures| captures[1].to_string())
}

pub(crate) fn normalize_images(payload: DdgImagesPayload) -> Vec<Image> {
    payload
        .results
        .into_iter()
        .take(MAX_IMAGES)
        .filter_map(|result| {
            let title = result.title.unwrap_or_default();
            let url = result
                .image
                .filter(|u| !u.is_empty())
                .or(result.thumbnail.filter(|u| !u.is_empty()))
                .unwrap_or_default();
            if url.is_empty() || title.is_empty() {
                return None;
            }
            Some(Image {
                url,
                description: title,
            })
        })
        .collect()
}
