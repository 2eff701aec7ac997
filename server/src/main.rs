//! farsight server binary
//!
//! Validates configuration, builds the provider registry, and serves the
//! HTTP API. A missing search credential disables only that provider's
//! route; chat needs at least one backend credential to start at all.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use farsight_search::{ProviderRegistry, SearchConfig};
use farsight_server::config::ChatConfig;
use farsight_server::web::{self, state::AppState};

#[derive(Debug, Parser)]
#[command(name = "farsight", about = "Search-grounded streaming report server")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let chat = ChatConfig::from_env();
    if !chat.any_available() {
        anyhow::bail!(
            "no completion backend credentials set (need at least one of \
             DEEPSEEK_API_KEY, OPENAI_API_KEY, GROQ_API_KEY)"
        );
    }
    for var in chat.missing_credentials() {
        tracing::warn!("{var} not set, its completion backend is unavailable");
    }

    let search = SearchConfig::from_env();
    for var in search.missing_credentials() {
        tracing::warn!("{var} not set, its search route is disabled");
    }

    let registry = ProviderRegistry::from_config(&search, reqwest::Client::new());
    tracing::info!(providers = ?registry.names(), "registered search providers");

    let state = AppState::new(registry, chat)?;
    web::serve(state, args.port).await
}

/// Tracing to stderr with env-based filtering; `LOG_FORMAT=json` switches
/// to structured output
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}
