//! Error taxonomy for search providers
//!
//! The server maps these onto HTTP status classes: bad input and
//! zero-result conditions are client-visible 4xx, upstream trouble is 5xx.

use thiserror::Error;

/// Errors that can occur when dispatching a search
#[derive(Debug, Error)]
pub enum SearchError {
    /// The caller sent an empty or whitespace-only query
    #[error("query parameter is required")]
    EmptyQuery,

    /// No adapter is registered under the requested name
    #[error("unknown search provider '{0}'")]
    UnknownProvider(String),

    /// The upstream endpoint answered with a non-success status
    #[error("{provider} request failed (status {status}): {message}")]
    Upstream {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The upstream payload was missing a field the adapter depends on
    #[error("invalid response format from {provider}: {detail}")]
    InvalidResponse {
        provider: &'static str,
        detail: String,
    },

    /// The upstream call succeeded but yielded zero usable results.
    /// Distinct from `Upstream`: this is a 404-class "try a different
    /// query" condition, not a provider failure.
    #[error("no search results found, please try a different query")]
    NoResults,

    /// The request never completed (connect, timeout, body read)
    #[error("{provider} request error: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl SearchError {
    /// Adapter shorthand for `.map_err(SearchError::http(PROVIDER))`
    pub(crate) fn http(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Http { provider, source }
    }
}
