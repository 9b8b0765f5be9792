#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream stream error: {0}")]
    Stream(String),
    #[error("malformed upstream payload: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Supabase(#[from] hypr_supabase_db::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to upsert chat: {0}")]
    Chat(#[source] StoreError),
    #[error("failed to upsert similarity results: {0}")]
    SimilarityResults(#[source] StoreError),
}
