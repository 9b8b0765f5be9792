mod config;
mod env;
mod error;
mod handler;
mod openapi;
mod persist;
pub mod prompt;
pub mod provider;
mod sse;
mod store;
mod types;
mod upstream;

pub use config::*;
pub use env::{ApiKey, Env, effective_api_key};
pub use error::{PersistError, ProviderError, StoreError};
pub use handler::router;
pub use openapi::openapi;
pub use persist::{CompletionPayload, PendingChat, chat_path, persist_completion};
pub use store::{
    CHATS_TABLE, ChatRecord, ChatStore, MATCH_PAGE_SECTIONS, SIMILARITY_RESULTS_TABLE,
    SimilarityQuery, SupabaseChatStore,
};
pub use types::{ChatMessage, ChatRequest, Role};
