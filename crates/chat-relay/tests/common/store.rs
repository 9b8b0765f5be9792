use std::sync::{Arc, Mutex};

use chat_relay::{ChatRecord, ChatStore, SimilarityQuery, StoreError};
use futures_util::future::BoxFuture;

#[derive(Default)]
struct Recorded {
    queries: Vec<SimilarityQuery>,
    chats: Vec<ChatRecord>,
    similarity_rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Default, Clone)]
pub struct MockStore {
    recorded: Arc<Mutex<Recorded>>,
    matches: Arc<Vec<serde_json::Value>>,
    fail_chat_upsert: bool,
    fail_similarity_upsert: bool,
}

impl MockStore {
    pub fn with_matches(matches: Vec<serde_json::Value>) -> Self {
        Self {
            matches: Arc::new(matches),
            ..Default::default()
        }
    }

    pub fn failing_chat_upsert() -> Self {
        Self {
            fail_chat_upsert: true,
            ..Default::default()
        }
    }

    pub fn failing_similarity_upsert(matches: Vec<serde_json::Value>) -> Self {
        Self {
            fail_similarity_upsert: true,
            ..Self::with_matches(matches)
        }
    }

    pub fn queries(&self) -> Vec<SimilarityQuery> {
        self.recorded.lock().unwrap().queries.clone()
    }

    pub fn chats(&self) -> Vec<ChatRecord> {
        self.recorded.lock().unwrap().chats.clone()
    }

    pub fn similarity_rows(&self) -> Vec<Vec<serde_json::Value>> {
        self.recorded.lock().unwrap().similarity_rows.clone()
    }

    pub fn is_untouched(&self) -> bool {
        let recorded = self.recorded.lock().unwrap();
        recorded.queries.is_empty()
            && recorded.chats.is_empty()
            && recorded.similarity_rows.is_empty()
    }
}

impl ChatStore for MockStore {
    fn match_page_sections<'a>(
        &'a self,
        query: &'a SimilarityQuery,
    ) -> BoxFuture<'a, Result<Vec<serde_json::Value>, StoreError>> {
        Box::pin(async move {
            self.recorded.lock().unwrap().queries.push(query.clone());
            Ok(self.matches.as_ref().clone())
        })
    }

    fn upsert_chat<'a>(&'a self, record: &'a ChatRecord) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            if self.fail_chat_upsert {
                return Err(StoreError::Other("chats table unavailable".into()));
            }
            self.recorded.lock().unwrap().chats.push(record.clone());
            Ok(())
        })
    }

    fn upsert_similarity_results<'a>(
        &'a self,
        rows: &'a [serde_json::Value],
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            if self.fail_similarity_upsert {
                return Err(StoreError::Other("similarity_results table unavailable".into()));
            }
            self.recorded
                .lock()
                .unwrap()
                .similarity_rows
                .push(rows.to_vec());
            Ok(())
        })
    }
}
