//! Bing adapter: web, image, and video search combined
//!
//! Issues three concurrent requests against the v7.0 API. Web results
//! take their image from the image results positionally; video results
//! carry their own thumbnail and are appended after the web results.

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;

use super::SearchProvider;
use crate::config::BingConfig;
use crate::error::SearchError;
use crate::types::{Image, SearchResponse, SearchResult, UNTITLED};

const PROVIDER: &str = "bing";
const RESULT_COUNT: &str = "5";

/// Bing Web Search API adapter
pub struct BingProvider {
    client: reqwest::Client,
    config: BingConfig,
}

impl BingProvider {
    pub fn new(client: reqwest::Client, config: BingConfig) -> Self {
        Self { client, config }
    }

    async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, SearchError> {
        let url = format!("{}/v7.0/{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(SearchError::http(PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Upstream {
                provider: PROVIDER,
                status: status.as_u16(),
                message: "failed to fetch results from Bing API".to_string(),
            });
        }
        Ok(response)
    }
}

// Bing API response types

#[derive(Debug, Deserialize)]
struct BingWebPayload {
    #[serde(rename = "webPages")]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebResult>,
}

#[derive(Debug, Deserialize)]
struct BingWebResult {
    name: Option<String>,
    snippet: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BingImagesPayload {
    #[serde(default)]
    value: Vec<BingImageResult>,
}

#[derive(Debug, Deserialize)]
struct BingImageResult {
    #[serde(rename = "thumbnailUrl")]
    thumbnail_url: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BingVideosPayload {
    #[serde(default)]
    pub(crate) value: Vec<BingVideoResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BingVideoResult {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    #[serde(rename = "contentUrl")]
    pub(crate) content_url: Option<String>,
    #[serde(rename = "hostPageUrl")]
    pub(crate) host_page_url: Option<String>,
    #[serde(rename = "thumbnailUrl")]
    pub(crate) thumbnail_url: Option<String>,
    #[serde(rename = "motionThumbnailUrl")]
    pub(crate) motion_thumbnail_url: Option<String>,
}

#[async_trait]
impl SearchProvider for BingProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let (web, images, videos) = tokio::try_join!(
            async {
                self.get("search", &[("q", query), ("count", RESULT_COUNT)])
                    .await?
                    .json::<BingWebPayload>()
                    .await
                    .map_err(SearchError::http(PROVIDER))
            },
            async {
                self.get("images/search", &[("q", query), ("count", RESULT_COUNT)])
                    .await?
                    .json::<BingImagesPayload>()
                    .await
                    .map_err(SearchError::http(PROVIDER))
            },
            async {
                self.get(
                    "videos/search",
                    &[
                        ("q", query),
                        ("count", RESULT_COUNT),
                        ("pricing", "Free"),
                        ("embedded", "player"),
                    ],
                )
                .await?
                .json::<BingVideosPayload>()
                .await
                .map_err(SearchError::http(PROVIDER))
            },
        )?;

        let mut results = normalize_web(web, &images);
        results.extend(normalize_videos(videos));
        if results.is_empty() {
            return Err(SearchError::NoResults);
        }

        // Image list covers both web and video results, in result order
        let images = results
            .iter()
            .filter_map(|result| result.image.clone())
            .collect();

        Ok(SearchResponse {
            results,
            images,
            answer: None,
        })
    }
}

fn normalize_web(payload: BingWebPayload, images: &BingImagesPayload) -> Vec<SearchResult> {
    let Some(pages) = payload.web_pages else {
        return Vec::new();
    };

    pages
        .value
        .into_iter()
        .enumerate()
        .filter_map(|(i, page)| {
            let url = page.url?;
            // Best-effort positional pairing with the independent image query
            let image = images.value.get(i).and_then(|img| {
                let thumbnail = img.thumbnail_url.clone().filter(|u| !u.is_empty())?;
                Some(Image {
                    url: thumbnail,
                    description: img.name.clone().unwrap_or_default(),
                })
            });
            Some(SearchResult {
                title: page.name.unwrap_or_else(|| UNTITLED.to_string()),
                content: page.snippet.unwrap_or_default(),
                url,
                image,
                ..Default::default()
            })
        })
        .collect()
}

pub(crate) fn normalize_videos(payload: BingVideosPayload) -> Vec<SearchResult> {
    payload
        .value
        .into_iter()
        .filter_map(|video| {
            // A video without a usable thumbnail is not renderable and is
            // dropped entirely, never emitted with a null image.
            let thumbnail = video
                .thumbnail_url
                .filter(|u| !u.is_empty())
                .or(video.motion_thumbnail_url.filter(|u| !u.is_empty()))?;
            let url = video.content_url.or(video.host_page_url)?;
            let name = video.name.unwrap_or_else(|| UNTITLED.to_string());
            Some(SearchResult {
                title: name.clone(),
                content: video.description.unwrap_or_else(|| name.clone()),
                url,
                image: Some(Image {
                    url: thumbnail,
                    description: name,
                }),
                ..Default::default()
            })
        })
        .collect()
}
