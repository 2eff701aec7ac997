//! Streaming chat route
//!
//! Proxies one completion request to the selected upstream backend and
//! re-frames its SSE-style byte stream into newline-delimited JSON
//! events. Failures before the first byte surface as a JSON error body;
//! failures after headers are sent can only terminate the stream.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures_util::{Stream, StreamExt};

use crate::chat::{self, stream::LineFramer, types::ChatRequest, types::CompletionEvent};

use super::state::AppState;
use super::ErrorResponse;

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let reasoning = chat::is_reasoning_model(&request.model);

    let upstream = chat::open_stream(
        &state.chat_client,
        &state.chat,
        &request.model,
        &request.messages,
    )
    .await
    .map_err(|e| {
        tracing::error!(model = %request.model, error = %e, "completion request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(event_stream(upstream, reasoning)))
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?;
    Ok(response)
}

/// Re-frame the upstream byte stream into newline-delimited events.
///
/// The framer is owned by this stream and dropped with it, including
/// when the client disconnects mid-response.
fn event_stream(
    upstream: reqwest::Response,
    reasoning: bool,
) -> impl Stream<Item = Result<Vec<u8>, axum::BoxError>> {
    async_stream::stream! {
        let mut framer = LineFramer::new();
        let mut chunks = upstream.bytes_stream();

        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    // Headers are long gone; the broken stream is the
                    // only signal left for the consumer
                    tracing::error!(error = %e, "error reading completion stream");
                    yield Err(axum::BoxError::from(e));
                    return;
                }
            };

            let text = String::from_utf8_lossy(&chunk);
            for line in framer.push(&text) {
                if let Some(event) = chat::stream::event_from_line(&line, reasoning) {
                    if let Some(bytes) = encode_event(&event) {
                        yield Ok(bytes);
                    }
                }
            }
        }

        // Best-effort flush of an unterminated trailing line; a parse
        // failure is logged inside and swallowed
        if let Some(line) = framer.finish() {
            if let Some(event) = chat::stream::event_from_line(&line, reasoning) {
                if let Some(bytes) = encode_event(&event) {
                    yield Ok(bytes);
                }
            }
        }
    }
}

fn encode_event(event: &CompletionEvent) -> Option<Vec<u8>> {
    let mut bytes = serde_json::to_vec(event).ok()?;
    bytes.push(b'\n');
    Some(bytes)
}
