//! Search route handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use farsight_search::{SearchError, SearchResponse};

use super::state::AppState;
use super::ErrorResponse;

/// Request body shared by every search route
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Dispatch one search to the named provider and map the error taxonomy
/// onto HTTP statuses
pub async fn search(
    State(state): State<AppState>,
    provider: &'static str,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.registry.dispatch(provider, &request.query).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(provider, error = %e, "search failed");
            } else {
                tracing::debug!(provider, error = %e, "search rejected");
            }
            Err((status, Json(ErrorResponse::new(e.to_string()))))
        }
    }
}

fn status_for(error: &SearchError) -> StatusCode {
    match error {
        SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
        SearchError::UnknownProvider(_) | SearchError::NoResults => StatusCode::NOT_FOUND,
        SearchError::Upstream { .. }
        | SearchError::InvalidResponse { .. }
        | SearchError::Http { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
