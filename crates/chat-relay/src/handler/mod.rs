mod streaming;

use streaming::*;

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use hypr_api_auth::AuthContext;
use reqwest::Client;

use crate::config::ChatRelayConfig;
use crate::env::effective_api_key;
use crate::error::ProviderError;
use crate::persist::PendingChat;
use crate::types::{ChatRequest, CompletionRequest};
use crate::upstream;

enum ProxyError {
    Upstream(ProviderError),
    Timeout,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Upstream(ProviderError::Status { status, body }) => {
                tracing::error!(upstream_status = %status, body = %body, "upstream_request_rejected");
                sentry::configure_scope(|scope| {
                    scope.set_tag("upstream.status", status.to_string());
                });
                (StatusCode::BAD_GATEWAY, body)
            }
            Self::Upstream(e) => {
                let (is_timeout, is_connect) = match &e {
                    ProviderError::Request(e) => (e.is_timeout(), e.is_connect()),
                    _ => (false, false),
                };
                tracing::error!(
                    error = %e,
                    is_timeout = %is_timeout,
                    is_connect = %is_connect,
                    "upstream_request_failed"
                );
                sentry::configure_scope(|scope| {
                    scope.set_tag("upstream.status", "request_failed");
                });
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            Self::Timeout => {
                tracing::error!("upstream_request_timeout");
                sentry::configure_scope(|scope| {
                    scope.set_tag("upstream.status", "timeout");
                });
                (StatusCode::GATEWAY_TIMEOUT, "Request timeout".to_string())
            }
        };
        (status, message).into_response()
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: ChatRelayConfig,
    pub(crate) client: Client,
}

/// Routes for the chat endpoint, relative to where they are nested (`/api`).
pub fn router(config: ChatRelayConfig) -> Router {
    let state = AppState {
        config,
        client: Client::new(),
    };

    Router::new()
        .route("/chat", post(chat_handler))
        .with_state(state)
}

async fn chat_handler(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();

    // Identity is checked before the body is looked at.
    let Some(Extension(auth)) = auth else {
        tracing::info!("chat_request_unauthorized");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };

    let request = match Json::<ChatRequest>::from_bytes(&body) {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "chat_request_malformed");
            return rejection.into_response();
        }
    };

    let config = &state.config;
    let api_key =
        effective_api_key(&config.api_key, request.preview_token.as_deref()).to_string();
    let pending = PendingChat::new(&request, auth.user_id());

    tracing::info!(
        user_id = %pending.user_id,
        message_count = %request.messages.len(),
        resuming = %request.id.is_some(),
        preview_token = %request.preview_token.is_some(),
        model = %config.model,
        provider = %config.provider.name(),
        "chat_request_received"
    );

    sentry::configure_scope(|scope| {
        scope.set_tag("llm.provider", config.provider.name());
        scope.set_tag("llm.model", &config.model);
        scope.set_user(Some(sentry::User {
            id: Some(pending.user_id.clone()),
            ..Default::default()
        }));

        let mut ctx = BTreeMap::new();
        ctx.insert("message_count".into(), request.messages.len().into());
        ctx.insert("preview_token".into(), request.preview_token.is_some().into());
        scope.set_context("chat_request", sentry::protocol::Context::Other(ctx));
    });

    let provider_request = match config.provider.build_request(&CompletionRequest {
        model: &config.model,
        messages: &pending.messages,
        temperature: config.temperature,
        stream: true,
    }) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(error = %e, "failed_to_build_provider_request");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid request").into_response();
        }
    };

    let result = tokio::time::timeout(
        config.timeout,
        upstream::open_completion_stream(
            &state.client,
            &*config.provider,
            &api_key,
            &provider_request,
        ),
    )
    .await;

    let response = match result {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => return ProxyError::Upstream(e).into_response(),
        Err(_) => return ProxyError::Timeout.into_response(),
    };

    handle_stream_response(state, response, pending, api_key, start_time)
}
