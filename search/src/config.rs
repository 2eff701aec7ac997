//! Provider configuration
//!
//! Credentials and endpoint bases are read from the environment once at
//! startup and never mutated afterwards. A provider with a missing
//! credential is left unregistered rather than failing requests later;
//! the rest of the process keeps serving.

/// Default endpoint bases. Carried in the config structs so tests can
/// point an adapter at a stub server.
pub const SERPER_BASE_URL: &str = "https://google.serper.dev";
pub const BING_BASE_URL: &str = "https://api.bing.microsoft.com";
pub const MOJEEK_BASE_URL: &str = "https://api.mojeek.com";
pub const DDG_HTML_BASE_URL: &str = "https://html.duckduckgo.com";
pub const DDG_HOME_BASE_URL: &str = "https://duckduckgo.com";

/// Serper.dev configuration, shared by the web, news, and scholar adapters
#[derive(Debug, Clone)]
pub struct SerperConfig {
    pub api_key: String,
    pub base_url: String,
}

impl SerperConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: SERPER_BASE_URL.to_string(),
        }
    }
}

/// Bing Web Search API configuration
#[derive(Debug, Clone)]
pub struct BingConfig {
    pub api_key: String,
    pub base_url: String,
}

impl BingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BING_BASE_URL.to_string(),
        }
    }
}

/// Mojeek Search API configuration
#[derive(Debug, Clone)]
pub struct MojeekConfig {
    pub api_key: String,
    pub base_url: String,
}

impl MojeekConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: MOJEEK_BASE_URL.to_string(),
        }
    }
}

/// DuckDuckGo scrape-fallback configuration. No credential: the adapter
/// parses public HTML pages.
#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    /// Base of the HTML results mirror
    pub html_base_url: String,
    /// Base of the home page carrying the image session token
    pub home_base_url: String,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            html_base_url: DDG_HTML_BASE_URL.to_string(),
            home_base_url: DDG_HOME_BASE_URL.to_string(),
        }
    }
}

/// Everything the registry needs to construct adapters. `None` means the
/// provider's credential was not set.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub serper: Option<SerperConfig>,
    pub bing: Option<BingConfig>,
    pub mojeek: Option<MojeekConfig>,
    pub duckduckgo: DuckDuckGoConfig,
}

impl SearchConfig {
    /// Load from the environment. Blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            serper: env_key("SERPER_API_KEY").map(SerperConfig::new),
            bing: env_key("BING_API_KEY").map(BingConfig::new),
            mojeek: env_key("MOJEEK_API_KEY").map(MojeekConfig::new),
            duckduckgo: DuckDuckGoConfig::default(),
        }
    }

    /// Environment variables that are unset, disabling their providers.
    /// Reported once at startup, never per-request.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.serper.is_none() {
            missing.push("SERPER_API_KEY");
        }
        if self.bing.is_none() {
            missing.push("BING_API_KEY");
        }
        if self.mojeek.is_none() {
            missing.push("MOJEEK_API_KEY");
        }
        missing
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
