mod error;
mod middleware;

pub use error::Error;
pub use middleware::{SESSION_COOKIE, attach_auth, session_token};

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Resolved caller identity, attached to request extensions by [`attach_auth`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }
}

struct VerifierInner {
    key: DecodingKey,
    validation: Validation,
}

/// Verifies HS256 session tokens signed with the project JWT secret.
#[derive(Clone)]
pub struct JwtVerifier {
    inner: Arc<VerifierInner>,
}

impl JwtVerifier {
    pub fn new(jwt_secret: &str) -> Self {
        Self::with_audience(jwt_secret, DEFAULT_AUDIENCE)
    }

    pub fn with_audience(jwt_secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        Self {
            inner: Arc::new(VerifierInner {
                key: DecodingKey::from_secret(jwt_secret.as_bytes()),
                validation,
            }),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.inner.key, &self.inner.validation)?;
        if data.claims.sub.is_empty() {
            return Err(Error::MissingSubject);
        }
        Ok(data.claims)
    }
}
