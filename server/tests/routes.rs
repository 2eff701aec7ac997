//! End-to-end route tests
//!
//! Each test spawns the real router on a random port and drives it with
//! reqwest; upstream completion backends are wiremock stubs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use farsight_search::{
    Image, ProviderRegistry, SearchError, SearchProvider, SearchResponse, SearchResult,
};
use farsight_server::config::{BackendConfig, ChatConfig};
use farsight_server::web::{create_router, state::AppState};

/// Stub adapter returning a canned outcome
struct StubProvider {
    name: &'static str,
    respond: Box<dyn Fn() -> Result<SearchResponse, SearchError> + Send + Sync>,
}

#[async_trait]
impl SearchProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, _query: &str) -> Result<SearchResponse, SearchError> {
        (self.respond)()
    }
}

fn paris_response() -> SearchResponse {
    let image = Image {
        url: "https://img.example/paris.jpg".to_string(),
        description: "Eiffel Tower".to_string(),
    };
    SearchResponse {
        results: vec![SearchResult {
            title: "Paris".to_string(),
            content: "Paris is the capital of France".to_string(),
            url: "https://example.com/paris".to_string(),
            snippet: Some("Paris is the capital of France".to_string()),
            image: Some(image.clone()),
            ..Default::default()
        }],
        images: vec![image],
        answer: Some("Paris".to_string()),
    }
}

fn stub_registry(respond: impl Fn() -> Result<SearchResponse, SearchError> + Send + Sync + 'static) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(StubProvider {
        name: "stub",
        respond: Box::new(respond),
    }));
    registry
}

/// Chat config with only DeepSeek configured, aimed at a stub upstream
fn chat_config(upstream: &str) -> ChatConfig {
    ChatConfig {
        deepseek: BackendConfig {
            url: format!("{upstream}/chat/completions"),
            api_key: Some("test-key".to_string()),
        },
        openai: BackendConfig {
            url: format!("{upstream}/v1/chat/completions"),
            api_key: None,
        },
        groq: BackendConfig {
            url: format!("{upstream}/openai/v1/chat/completions"),
            api_key: None,
        },
    }
}

async fn spawn_app(registry: ProviderRegistry, chat: ChatConfig) -> String {
    let state = AppState::new(registry, chat).expect("state");
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn chat_body(model: &str) -> Value {
    json!({
        "messages": [{ "role": "user", "content": "hello" }],
        "model": model
    })
}

#[tokio::test]
async fn health_lists_providers_and_backends() {
    let base = spawn_app(stub_registry(|| Ok(paris_response())), chat_config("http://unused")).await;

    let body: Value = reqwest::get(format!("{base}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["providers"], json!(["stub"]));
    assert_eq!(body["backends"], json!(["DeepSeek"]));
}

#[tokio::test]
async fn search_returns_normalized_results() {
    let base = spawn_app(stub_registry(|| Ok(paris_response())), chat_config("http://unused")).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/stub"))
        .json(&json!({ "query": "capital of France" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["results"][0]["title"], "Paris");
    assert_eq!(body["results"][0]["url"], "https://example.com/paris");
    assert_eq!(body["results"][0]["image"]["url"], "https://img.example/paris.jpg");
    assert_eq!(body["images"].as_array().unwrap().len(), 1);
    assert_eq!(body["answer"], "Paris");
}

#[tokio::test]
async fn empty_query_is_a_client_error() {
    let base = spawn_app(stub_registry(|| Ok(paris_response())), chat_config("http://unused")).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/stub"))
        .json(&json!({ "query": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "query parameter is required");
}

#[tokio::test]
async fn zero_results_map_to_not_found() {
    let base = spawn_app(
        stub_registry(|| Err(SearchError::NoResults)),
        chat_config("http://unused"),
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/stub"))
        .json(&json!({ "query": "obscure" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("try a different query"));
}

#[tokio::test]
async fn upstream_failures_map_to_server_error() {
    let base = spawn_app(
        stub_registry(|| {
            Err(SearchError::Upstream {
                provider: "stub",
                status: 503,
                message: "backend down".to_string(),
            })
        }),
        chat_config("http://unused"),
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/stub"))
        .json(&json!({ "query": "anything" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn unregistered_provider_has_no_route() {
    let base = spawn_app(stub_registry(|| Ok(paris_response())), chat_config("http://unused")).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/serper"))
        .json(&json!({ "query": "anything" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn chat_re_frames_the_upstream_stream() {
    let upstream = MockServer::start().await;
    let body = concat!(
        "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n",
        ": keep-alive\n",
        "data: this is not json\n",
        "\n",
        "data: {\"id\":\"2\",\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n",
        "data: [DONE]\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/event-stream"),
        )
        .mount(&upstream)
        .await;

    let base = spawn_app(ProviderRegistry::new(), chat_config(&upstream.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&chat_body("deepseek-chat"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );
    assert_eq!(response.headers()["cache-control"].to_str().unwrap(), "no-cache");

    let text = response.text().await.unwrap();
    let events: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("every emitted line is JSON"))
        .collect();

    // sentinels, blanks, and the malformed line are gone
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["choices"][0]["delta"]["content"], "Hello");
    assert_eq!(events[1]["choices"][0]["delta"]["content"], " world");
    // non-reasoning model: the reasoning channel is absent entirely
    assert!(events[0]["choices"][0]["delta"].get("reasoning_content").is_none());
}

#[tokio::test]
async fn chat_splits_reasoning_deltas_per_event() {
    let upstream = MockServer::start().await;
    let body = concat!(
        "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"<think>partial\"}}]}\n",
        "data: {\"id\":\"2\",\"choices\":[{\"delta\":{\"content\":\"answer text\"}}]}\n",
        "data: [DONE]\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/event-stream"),
        )
        .mount(&upstream)
        .await;

    let base = spawn_app(ProviderRegistry::new(), chat_config(&upstream.uri())).await;

    let text = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&chat_body("deepseek-reasoner"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let events: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["choices"][0]["delta"]["content"], "");
    assert_eq!(events[0]["choices"][0]["delta"]["reasoning_content"], "<think>partial");
    assert_eq!(events[1]["choices"][0]["delta"]["content"], "answer text");
    assert_eq!(events[1]["choices"][0]["delta"]["reasoning_content"], "");
}

#[tokio::test]
async fn chat_flushes_an_unterminated_trailing_line() {
    let upstream = MockServer::start().await;
    // no trailing newline on the final payload
    let body = concat!(
        "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"first\"}}]}\n",
        "data: {\"id\":\"tail\",\"choices\":[{\"delta\":{\"content\":\"last\"}}]}",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/event-stream"),
        )
        .mount(&upstream)
        .await;

    let base = spawn_app(ProviderRegistry::new(), chat_config(&upstream.uri())).await;

    let text = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&chat_body("deepseek-chat"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let events: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["id"], "tail");
    assert_eq!(events[1]["choices"][0]["delta"]["content"], "last");
}

#[tokio::test]
async fn chat_without_credential_fails_before_any_network_call() {
    let upstream = MockServer::start().await;
    // the OpenAI route has no key configured; nothing may reach upstream
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_app(ProviderRegistry::new(), chat_config(&upstream.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&chat_body("gpt-4o-mini"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "API key not found for OpenAI");
}

#[tokio::test]
async fn chat_surfaces_the_upstream_error_message() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(402)
                .set_body_json(json!({ "error": { "message": "Insufficient Balance" } })),
        )
        .mount(&upstream)
        .await;

    let base = spawn_app(ProviderRegistry::new(), chat_config(&upstream.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&chat_body("deepseek-chat"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Insufficient Balance"));
}
