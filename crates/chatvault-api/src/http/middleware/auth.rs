//! API key gateway.
//!
//! Accepts the shared secret from either header:
//! - `X-API-Key: <key>`
//! - `Authorization: Bearer <key>`
//!
//! Runs before the rate limiter, so rejected callers never consume quota or
//! reach the store.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chatvault_types::error::AuthError;

use crate::http::error::AppError;
use crate::state::AppState;

pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = extract_api_key(req.headers())?;

    if let Err(e) = state.gate.verify(presented) {
        tracing::warn!(method = %req.method(), path = %req.uri().path(), reason = %e, "rejected request");
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

/// Pull the presented key out of the headers. `Ok(None)` means neither header
/// was sent; an undecodable header is treated as a wrong key.
fn extract_api_key(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    if let Some(key) = headers.get("x-api-key") {
        let key = key.to_str().map_err(|_| AuthError::Invalid)?;
        return Ok(Some(key.trim()));
    }

    if let Some(auth) = headers.get(AUTHORIZATION) {
        let auth = auth.to_str().map_err(|_| AuthError::Invalid)?;
        return match auth.strip_prefix("Bearer ") {
            Some(key) => Ok(Some(key.trim())),
            None => Err(AuthError::Invalid),
        };
    }

    Ok(None)
}
