use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct Env {
    #[serde(flatten)]
    pub openai: hypr_api_env::OpenAIEnv,
}

pub struct ApiKey(pub String);

impl From<&Env> for ApiKey {
    fn from(env: &Env) -> Self {
        Self(env.openai.openai_api_key.clone())
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Provider key for one request: the caller's preview token when given,
/// otherwise the configured key. Never written back to shared config.
pub fn effective_api_key<'a>(configured: &'a str, preview_token: Option<&'a str>) -> &'a str {
    preview_token.filter(|t| !t.is_empty()).unwrap_or(configured)
}
