#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("session token has an empty subject")]
    MissingSubject,
}
