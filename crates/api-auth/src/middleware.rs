use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{AuthContext, JwtVerifier};

pub const SESSION_COOKIE: &str = "sb-access-token";

/// Session token from `Authorization: Bearer ..`, falling back to the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Attaches an [`AuthContext`] when the request carries a valid session.
///
/// Requests without one pass through untouched; handlers decide whether
/// identity is required.
pub async fn attach_auth(
    State(verifier): State<JwtVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(request.headers()) {
        match verifier.verify(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthContext { claims });
            }
            Err(e) => {
                tracing::debug!(error = %e, "session_token_rejected");
            }
        }
    }

    next.run(request).await
}
