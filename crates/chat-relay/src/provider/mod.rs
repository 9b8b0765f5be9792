mod openai;

pub use openai::OpenAIProvider;

use crate::error::ProviderError;
use crate::types::{CompletionRequest, EmbeddingRequest};

/// One decoded item of an upstream completion stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Delta(String),
    Done,
}

/// Wire format of a completion provider. HTTP itself is driven by `upstream`.
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn chat_completions_url(&self) -> String;

    fn embeddings_url(&self) -> String;

    fn build_auth_header(&self, api_key: &str) -> String {
        format!("Bearer {}", api_key)
    }

    fn additional_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn build_request(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(request)
    }

    fn build_embedding_request(
        &self,
        request: &EmbeddingRequest<'_>,
    ) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(request)
    }

    /// Decodes a single SSE `data:` payload. `Ok(None)` means nothing to forward.
    fn parse_stream_data(&self, data: &str) -> Result<Option<StreamEvent>, ProviderError>;

    fn parse_embedding(&self, body: &serde_json::Value) -> Result<Vec<f32>, ProviderError>;
}
