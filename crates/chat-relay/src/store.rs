use futures_util::future::BoxFuture;
use hypr_supabase_db::SupabaseDb;
use serde::Serialize;

use crate::error::StoreError;
use crate::persist::CompletionPayload;

pub const MATCH_PAGE_SECTIONS: &str = "match_page_sections";
pub const CHATS_TABLE: &str = "chats";
pub const SIMILARITY_RESULTS_TABLE: &str = "similarity_results";

/// Named arguments of the `match_page_sections` database function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityQuery {
    pub embedding: Vec<f32>,
    pub match_threshold: f32,
    pub match_count: u32,
    pub min_content_length: u32,
}

/// Row written to the chats table.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRecord {
    pub id: String,
    pub user_id: String,
    pub payload: CompletionPayload,
}

impl From<CompletionPayload> for ChatRecord {
    fn from(payload: CompletionPayload) -> Self {
        Self {
            id: payload.id.clone(),
            user_id: payload.user_id.clone(),
            payload,
        }
    }
}

/// Durable storage used once a completion has finished streaming.
///
/// Each call either succeeds or returns an error; the two upserts are
/// independent and never share a transaction.
pub trait ChatStore: Send + Sync {
    fn match_page_sections<'a>(
        &'a self,
        query: &'a SimilarityQuery,
    ) -> BoxFuture<'a, Result<Vec<serde_json::Value>, StoreError>>;

    fn upsert_chat<'a>(&'a self, record: &'a ChatRecord) -> BoxFuture<'a, Result<(), StoreError>>;

    fn upsert_similarity_results<'a>(
        &'a self,
        rows: &'a [serde_json::Value],
    ) -> BoxFuture<'a, Result<(), StoreError>>;
}

#[derive(Clone)]
pub struct SupabaseChatStore {
    db: SupabaseDb,
}

impl SupabaseChatStore {
    pub fn new(db: SupabaseDb) -> Self {
        Self { db }
    }
}

impl ChatStore for SupabaseChatStore {
    fn match_page_sections<'a>(
        &'a self,
        query: &'a SimilarityQuery,
    ) -> BoxFuture<'a, Result<Vec<serde_json::Value>, StoreError>> {
        Box::pin(async move {
            let rows: Option<Vec<serde_json::Value>> =
                self.db.rpc(MATCH_PAGE_SECTIONS, query).await?;
            Ok(rows.unwrap_or_default())
        })
    }

    fn upsert_chat<'a>(&'a self, record: &'a ChatRecord) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.db.upsert(CHATS_TABLE, record, Some("id")).await?;
            Ok(())
        })
    }

    fn upsert_similarity_results<'a>(
        &'a self,
        rows: &'a [serde_json::Value],
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.db
                .upsert(SIMILARITY_RESULTS_TABLE, rows, None)
                .await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> SupabaseChatStore {
        SupabaseChatStore::new(SupabaseDb::new(
            reqwest::Client::new(),
            &server.uri(),
            "service-key",
        ))
    }

    #[tokio::test]
    async fn similarity_rpc_uses_named_args() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/match_page_sections"))
            .and(body_json(serde_json::json!({
                "embedding": [0.5, 0.25],
                "match_threshold": 0.5,
                "match_count": 5,
                "min_content_length": 10
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "content": "Chlorophyll absorbs light", "similarity": 0.82}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = store(&server)
            .match_page_sections(&SimilarityQuery {
                embedding: vec![0.5, 0.25],
                match_threshold: 0.5,
                match_count: 5,
                min_content_length: 10,
            })
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["content"], "Chlorophyll absorbs light");
    }

    #[tokio::test]
    async fn null_rpc_result_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/match_page_sections"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let rows = store(&server)
            .match_page_sections(&SimilarityQuery {
                embedding: vec![],
                match_threshold: 0.5,
                match_count: 5,
                min_content_length: 10,
            })
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn chat_upsert_is_keyed_on_id() {
        let server = MockServer::start().await;

        let payload = CompletionPayload {
            id: "chat-1".into(),
            title: "Hello".into(),
            user_id: "user-1".into(),
            created_at: 1_700_000_000_000,
            path: "/chat/chat-1".into(),
            messages: vec![ChatMessage::user("Hello"), ChatMessage::assistant("Hi")],
        };

        Mock::given(method("POST"))
            .and(path("/rest/v1/chats"))
            .and(query_param("on_conflict", "id"))
            .and(body_json(serde_json::json!({
                "id": "chat-1",
                "user_id": "user-1",
                "payload": {
                    "id": "chat-1",
                    "title": "Hello",
                    "userId": "user-1",
                    "createdAt": 1_700_000_000_000i64,
                    "path": "/chat/chat-1",
                    "messages": [
                        {"role": "user", "content": "Hello"},
                        {"role": "assistant", "content": "Hi"}
                    ]
                }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .upsert_chat(&ChatRecord::from(payload))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_upsert_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/similarity_results"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let result = store(&server)
            .upsert_similarity_results(&[serde_json::json!({"id": 1})])
            .await;

        assert!(matches!(result, Err(StoreError::Supabase(_))));
    }
}
