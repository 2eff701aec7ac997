//! HTTP surface
//!
//! One POST search route per registered provider (driven off the
//! registry, so a provider without credentials never gets a route), the
//! streaming chat route, and a health probe.

pub mod chat_api;
pub mod search_api;
pub mod state;

use std::net::SocketAddr;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Error body shared by every route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Start the server
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut api = Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat_api::chat));

    for name in state.registry.names() {
        api = api.route(
            &format!("/{name}"),
            post(move |state: State<AppState>, body: Json<search_api::SearchRequest>| {
                search_api::search(state, name, body)
            }),
        );
    }

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health probe response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Search providers with routes registered
    pub providers: Vec<&'static str>,
    /// Completion backends with credentials configured
    pub backends: Vec<&'static str>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        providers: state.registry.names(),
        backends: state.chat.available_backends(),
    })
}
