use std::sync::Arc;
use std::time::Duration;

use crate::env::{ApiKey, Env};
use crate::provider::{OpenAIProvider, Provider};
use crate::store::{ChatStore, SimilarityQuery};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

const DEFAULT_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_MATCH_THRESHOLD: f32 = 0.5;
const DEFAULT_MATCH_COUNT: u32 = 5;
const DEFAULT_MIN_CONTENT_LENGTH: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityConfig {
    pub match_threshold: f32,
    pub match_count: u32,
    pub min_content_length: u32,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            match_count: DEFAULT_MATCH_COUNT,
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
        }
    }
}

impl SimilarityConfig {
    pub fn query(&self, embedding: Vec<f32>) -> SimilarityQuery {
        SimilarityQuery {
            embedding,
            match_threshold: self.match_threshold,
            match_count: self.match_count,
            min_content_length: self.min_content_length,
        }
    }
}

#[derive(Clone)]
pub struct ChatRelayConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub embedding_model: String,
    /// Bound on receiving upstream response headers; streaming is not bounded.
    pub timeout: Duration,
    pub similarity: SimilarityConfig,
    pub provider: Arc<dyn Provider>,
    pub store: Arc<dyn ChatStore>,
}

impl ChatRelayConfig {
    pub fn new(api_key: impl Into<ApiKey>, store: Arc<dyn ChatStore>) -> Self {
        Self {
            api_key: api_key.into().0,
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            similarity: SimilarityConfig::default(),
            provider: Arc::new(OpenAIProvider::default()),
            store,
        }
    }

    pub fn from_env(env: &Env, store: Arc<dyn ChatStore>) -> Self {
        let config = Self::new(env, store);
        match &env.openai.openai_base_url {
            Some(base_url) => config.with_provider(Arc::new(OpenAIProvider::new(base_url.clone()))),
            None => config,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_similarity(mut self, similarity: SimilarityConfig) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = provider;
        self
    }
}
