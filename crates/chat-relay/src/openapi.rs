use utoipa::OpenApi;

use crate::types::ChatRequest;

#[utoipa::path(
    post,
    path = "/api/chat",
    operation_id = "chat_completion_relay",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Generated tokens streamed as plain text"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Upstream provider failed"),
        (status = 504, description = "Request timeout"),
    ),
    tag = "chat",
)]
async fn _chat_spec() {}

#[derive(OpenApi)]
#[openapi(
    paths(_chat_spec),
    components(schemas(ChatRequest)),
    tags((name = "chat", description = "Streaming chat completion relay"))
)]
pub struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
