use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Message author. Roles the relay has no special handling for are carried
/// through as-is; the provider decides whether they are valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[serde(untagged)]
    Other(String),
}

/// One conversation message. Fields other than `role` and `content`
/// (`name`, `tool_call_id`, `function_call`, ...) are kept and forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Value::String(content.into()),
            extra: Map::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Text content, when the message carries a plain string.
    pub fn text(&self) -> Option<&str> {
        self.content.as_str()
    }
}

/// Inbound body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<ChatMessage>,
    /// Provider key used for this request only, instead of the configured one.
    #[serde(
        default,
        deserialize_with = "hypr_api_env::filter_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_token: Option<String>,
    /// Existing conversation to overwrite; a new id is generated when absent.
    #[serde(
        default,
        deserialize_with = "hypr_api_env::filter_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f64,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
}
