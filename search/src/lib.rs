//! Search provider adapters for farsight
//!
//! Each adapter normalizes one upstream vendor's response shape (web,
//! image, video, news, scholar, or raw HTML scrape) into the common
//! `SearchResponse` model. Adapters are registered by name in a
//! `ProviderRegistry`; the HTTP layer dispatches to exactly one of them
//! per request.
//!
//! # Configuration
//! One credential per provider, read from the environment at startup
//! (`SERPER_API_KEY`, `BING_API_KEY`, `MOJEEK_API_KEY`). A provider with
//! a missing credential is simply not registered; the scrape fallback
//! needs none.

pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::SearchConfig;
pub use error::SearchError;
pub use providers::{ProviderRegistry, SearchProvider};
pub use types::{Image, SearchResponse, SearchResult};
