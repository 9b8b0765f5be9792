use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use chat_relay::ChatRelayConfig;
use chat_relay::provider::OpenAIProvider;
use hypr_api_auth::{AuthContext, Claims};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::store::MockStore;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_USER_ID: &str = "user-221b";

pub struct TestHarness {
    pub mock_server: MockServer,
    pub store: MockStore,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_store(MockStore::default()).await
    }

    pub async fn with_store(store: MockStore) -> Self {
        Self {
            mock_server: MockServer::start().await,
            store,
        }
    }

    pub fn config(&self) -> ChatRelayConfig {
        ChatRelayConfig::new(TEST_API_KEY, Arc::new(self.store.clone())).with_provider(Arc::new(
            OpenAIProvider::new(format!("{}/v1", self.mock_server.uri())),
        ))
    }

    pub async fn mount_stream_response(&self, api_key: &str, tokens: &[&str]) {
        self.mount_delayed_stream_response(api_key, tokens, Duration::ZERO)
            .await;
    }

    pub async fn mount_delayed_stream_response(
        &self,
        api_key: &str,
        tokens: &[&str],
        delay: Duration,
    ) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", format!("Bearer {api_key}").as_str()))
            .and(header("Content-Type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(sse_body(tokens))
                    .insert_header("Content-Type", "text/event-stream")
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mount_embedding_response(&self, api_key: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("Authorization", format!("Bearer {api_key}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [{"object": "embedding", "index": 0, "embedding": [0.125, -0.5, 0.75]}],
                "model": "text-embedding-ada-002"
            })))
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mount_error_response(&self, route: &str, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn upstream_bodies(&self, route: &str) -> Vec<serde_json::Value> {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == route)
            .map(|r| r.body_json::<serde_json::Value>().unwrap())
            .collect()
    }
}

pub fn sse_body(tokens: &[&str]) -> String {
    let mut chunks = vec![
        r#"data: {"id":"chatcmpl-1","object":"chat.completion.chunk","model":"gpt-3.5-turbo","choices":[{"index":0,"delta":{"role":"assistant","content":""},"finish_reason":null}]}"#.to_string(),
    ];
    for token in tokens {
        let chunk = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "model": "gpt-3.5-turbo",
            "choices": [{"index": 0, "delta": {"content": token}, "finish_reason": null}]
        });
        chunks.push(format!("data: {chunk}"));
    }
    chunks.push(
        r#"data: {"id":"chatcmpl-1","object":"chat.completion.chunk","model":"gpt-3.5-turbo","choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#.to_string(),
    );
    chunks.push("data: [DONE]".to_string());

    let mut body = chunks.join("\n\n");
    body.push_str("\n\n");
    body
}

pub fn auth_context(user_id: &str) -> AuthContext {
    AuthContext {
        claims: Claims {
            sub: user_id.to_string(),
            exp: u64::MAX,
            aud: Some("authenticated".into()),
            email: None,
            role: Some("authenticated".into()),
        },
    }
}

pub fn build_request(body: serde_json::Value, user_id: Option<&str>) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    if let Some(user_id) = user_id {
        request.extensions_mut().insert(auth_context(user_id));
    }
    request
}

pub fn user_message(content: &str) -> serde_json::Value {
    serde_json::json!({
        "messages": [{"role": "user", "content": content}]
    })
}

pub async fn response_to_string(response: axum::http::Response<Body>) -> String {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body_bytes).to_string()
}
