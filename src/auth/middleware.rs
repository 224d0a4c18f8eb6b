use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Identity attached to requests that passed [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i32,
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Rejects the request with 401 when no bearer token is present and with 403
/// when the token does not verify. Otherwise stores [`AuthUser`] in the
/// request extensions.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::MissingToken)?;

    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "rejected token");
        ApiError::InvalidToken
    })?;

    req.extensions_mut().insert(AuthUser { id: claims.id });
    Ok(next.run(req).await)
}
