//! Common types for search results
//!
//! These types are used across all provider adapters to give the HTTP
//! layer and the prompt compositor one consistent shape.

use serde::{Deserialize, Serialize};

/// Fallback title used when a provider omits one
pub(crate) const UNTITLED: &str = "Untitled";

/// An image attached to a search result or returned by an image search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Directly fetchable image URL
    pub url: String,
    /// Caption or alt text; empty when the provider has none, never null
    #[serde(default)]
    pub description: String,
}

/// A single normalized search result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result
    pub title: String,
    /// Best available summary text from the provider
    pub content: String,
    /// Absolute URL of the result
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    /// Publication date (news and scholar results)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Publishing outlet or venue (news and scholar results)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Citation count (scholar results)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<u64>,
    /// Author list (scholar results)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
}

/// Aggregate response returned by every provider adapter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub images: Vec<Image>,
    /// Direct answer extracted from an answer box or knowledge graph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// Attach `images[i]` to `results[i]` by position.
///
/// Best effort only: the result and image lists come from independent
/// upstream queries, so index `i` is not guaranteed to be semantically
/// related to result `i`. Preserved from the original behavior.
pub(crate) fn attach_images(results: &mut [SearchResult], images: &[Image]) {
    for (result, image) in results.iter_mut().zip(images) {
        result.image = Some(image.clone());
    }
}
