use super::{Provider, StreamEvent};
use crate::error::ProviderError;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Clone)]
pub struct OpenAIProvider {
    base_url: String,
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new(OPENAI_API_BASE)
    }
}

impl OpenAIProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Provider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    fn parse_stream_data(&self, data: &str) -> Result<Option<StreamEvent>, ProviderError> {
        if data == DONE_SENTINEL {
            return Ok(Some(StreamEvent::Done));
        }

        let value: serde_json::Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "skipping_unparseable_stream_chunk");
                return Ok(None);
            }
        };

        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ProviderError::Stream(message));
        }

        let delta = value
            .pointer("/choices/0/delta/content")
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty());

        Ok(delta.map(|c| StreamEvent::Delta(c.to_string())))
    }

    fn parse_embedding(&self, body: &serde_json::Value) -> Result<Vec<f32>, ProviderError> {
        let values = body
            .pointer("/data/0/embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| ProviderError::Decode("embedding missing from response".into()))?;

        values
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| ProviderError::Decode("non-numeric embedding value".into()))
            })
            .collect()
    }
}
