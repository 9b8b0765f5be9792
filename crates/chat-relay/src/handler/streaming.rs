use std::future::Future;
use std::time::Instant;

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use super::AppState;
use crate::error::ProviderError;
use crate::persist::{PendingChat, persist_completion};
use crate::provider::StreamEvent;
use crate::sse;

/// Forwards text deltas as they arrive and runs `on_completion` with the
/// full text once the terminal event is seen, before the body ends.
///
/// An upstream error ends the body with that error and skips the hook.
pub(crate) fn relay_tokens<S, F, Fut>(
    events: S,
    on_completion: F,
) -> impl Stream<Item = Result<Bytes, ProviderError>> + Send + 'static
where
    S: Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'static,
    F: FnOnce(String) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async_stream::stream! {
        let mut events = Box::pin(events);
        let mut completion = String::new();

        while let Some(event) = events.next().await {
            match event {
                Ok(StreamEvent::Delta(text)) => {
                    completion.push_str(&text);
                    yield Ok(Bytes::from(text));
                }
                Ok(StreamEvent::Done) => {
                    on_completion(completion).await;
                    return;
                }
                Err(e) => {
                    tracing::error!(error = %e, "provider_stream_failed");
                    yield Err(e);
                    return;
                }
            }
        }
    }
}

pub(super) fn handle_stream_response(
    state: AppState,
    response: reqwest::Response,
    pending: PendingChat,
    api_key: String,
    start_time: Instant,
) -> Response {
    let events = sse::event_stream(response, state.config.provider.clone());

    let on_completion = move |completion: String| async move {
        tracing::info!(
            completion_chars = %completion.chars().count(),
            latency_ms = %start_time.elapsed().as_millis(),
            "chat_completion_finished"
        );

        let created_at = chrono::Utc::now().timestamp_millis();
        let payload = pending.into_payload(&completion, created_at);
        let chat_id = payload.id.clone();

        if let Err(e) =
            persist_completion(&state.config, &state.client, &api_key, payload, &completion).await
        {
            tracing::error!(chat_id = %chat_id, error = %e, "completion_persist_failed");
            sentry::capture_message(
                &format!("failed to persist chat {chat_id}: {e}"),
                sentry::Level::Error,
            );
        }
    };

    let body = Body::from_stream(relay_tokens(events, on_completion));

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
