use reqwest::Client;
use serde::Serialize;

use crate::config::ChatRelayConfig;
use crate::error::PersistError;
use crate::prompt;
use crate::store::ChatRecord;
use crate::types::{ChatMessage, ChatRequest};
use crate::upstream;

/// Conversation transcript persisted once a completion has finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayload {
    pub id: String,
    pub title: String,
    pub user_id: String,
    pub created_at: i64,
    pub path: String,
    pub messages: Vec<ChatMessage>,
}

pub fn chat_path(id: &str) -> String {
    format!("/chat/{id}")
}

pub fn new_chat_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Everything the completion hook needs, captured when the request arrives.
#[derive(Debug, Clone)]
pub struct PendingChat {
    pub id: Option<String>,
    pub title: String,
    pub user_id: String,
    /// Persona followed by the caller's messages.
    pub messages: Vec<ChatMessage>,
}

impl PendingChat {
    pub fn new(request: &ChatRequest, user_id: impl Into<String>) -> Self {
        Self {
            id: request.id.clone(),
            title: prompt::title(&request.messages),
            user_id: user_id.into(),
            messages: prompt::with_persona(&request.messages),
        }
    }

    pub fn into_payload(self, completion: &str, created_at: i64) -> CompletionPayload {
        let id = self.id.unwrap_or_else(new_chat_id);
        let mut messages = self.messages;
        messages.push(ChatMessage::assistant(completion));

        CompletionPayload {
            path: chat_path(&id),
            id,
            title: self.title,
            user_id: self.user_id,
            created_at,
            messages,
        }
    }
}

async fn find_similar_sections(
    config: &ChatRelayConfig,
    client: &Client,
    api_key: &str,
    completion: &str,
) -> Vec<serde_json::Value> {
    let embedding = match upstream::create_embedding(
        client,
        &*config.provider,
        api_key,
        &config.embedding_model,
        completion,
    )
    .await
    {
        Ok(embedding) => embedding,
        Err(e) => {
            tracing::warn!(error = %e, "completion_embedding_failed");
            return Vec::new();
        }
    };

    let query = config.similarity.query(embedding);
    match config.store.match_page_sections(&query).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "similarity_search_failed");
            Vec::new()
        }
    }
}

/// Embeds the completion, looks up similar sections, then upserts the chat
/// and the matched rows as two separate writes.
///
/// Embedding or lookup failures only cost the similarity rows; either
/// upsert failing is returned.
pub async fn persist_completion(
    config: &ChatRelayConfig,
    client: &Client,
    api_key: &str,
    payload: CompletionPayload,
    completion: &str,
) -> Result<(), PersistError> {
    let matches = find_similar_sections(config, client, api_key, completion).await;

    let record = ChatRecord::from(payload);
    config
        .store
        .upsert_chat(&record)
        .await
        .map_err(PersistError::Chat)?;

    if matches.is_empty() {
        tracing::debug!(chat_id = %record.id, "no_similar_sections");
        return Ok(());
    }

    config
        .store
        .upsert_similarity_results(&matches)
        .await
        .map_err(PersistError::SimilarityResults)?;

    tracing::info!(
        chat_id = %record.id,
        similarity_rows = %matches.len(),
        "completion_persisted"
    );
    Ok(())
}
