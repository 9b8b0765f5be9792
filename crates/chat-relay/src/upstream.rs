use reqwest::Client;

use crate::error::ProviderError;
use crate::provider::Provider;
use crate::types::EmbeddingRequest;

fn authorized_post(
    client: &Client,
    provider: &dyn Provider,
    url: String,
    api_key: &str,
) -> reqwest::RequestBuilder {
    let mut req_builder = client
        .post(url)
        .header("Content-Type", "application/json")
        .header("Authorization", provider.build_auth_header(api_key));

    for (key, value) in provider.additional_headers() {
        req_builder = req_builder.header(key, value);
    }

    req_builder
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status { status, body })
}

/// Sends a streaming chat completion request and returns once response headers arrive.
pub(crate) async fn open_completion_stream(
    client: &Client,
    provider: &dyn Provider,
    api_key: &str,
    body: &serde_json::Value,
) -> Result<reqwest::Response, ProviderError> {
    let response = authorized_post(client, provider, provider.chat_completions_url(), api_key)
        .json(body)
        .send()
        .await?;

    ensure_success(response).await
}

pub(crate) async fn create_embedding(
    client: &Client,
    provider: &dyn Provider,
    api_key: &str,
    model: &str,
    input: &str,
) -> Result<Vec<f32>, ProviderError> {
    let body = provider
        .build_embedding_request(&EmbeddingRequest { model, input })
        .map_err(|e| ProviderError::Decode(e.to_string()))?;

    let response = authorized_post(client, provider, provider.embeddings_url(), api_key)
        .json(&body)
        .send()
        .await?;

    let value: serde_json::Value = ensure_success(response).await?.json().await?;
    provider.parse_embedding(&value)
}
