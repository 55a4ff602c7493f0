//! Application error type mapping to HTTP status codes and envelope format.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use chatvault_types::error::{AuthError, ChatError, RateLimitExceeded, ValidationError};

use crate::http::middleware::request_id::current_request_id;
use crate::http::response::ErrorEnvelope;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session, message, and storage errors from the chat service.
    Chat(ChatError),
    /// Missing or wrong API key.
    Unauthorized(AuthError),
    /// Per-address quota exhausted.
    RateLimited(RateLimitExceeded),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Chat(ChatError::Validation(e))
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Unauthorized(e)
    }
}

impl From<RateLimitExceeded> for AppError {
    fn from(e: RateLimitExceeded) -> Self {
        AppError::RateLimited(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::new("body", rejection.body_text()).into()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        ValidationError::new("query", rejection.body_text()).into()
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        ValidationError::new("sessionId", rejection.body_text()).into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Chat(ChatError::Validation(e)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                e.to_string(),
                Some(json!({ "field": e.field })),
            ),
            AppError::Chat(ChatError::SessionNotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
                None,
            ),
            AppError::Chat(ChatError::Storage(detail)) => {
                tracing::error!(error = %detail, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Storage is temporarily unavailable".to_string(),
                    None,
                )
            }
            AppError::Chat(ChatError::Timeout) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_TIMEOUT",
                "Storage did not respond in time".to_string(),
                None,
            ),
            AppError::Chat(ChatError::Internal(detail)) => {
                tracing::error!(error = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Unauthorized(e) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                format!(
                    "{e}. Provide the key via 'X-API-Key: <key>' or 'Authorization: Bearer <key>'."
                ),
                None,
            ),
            AppError::RateLimited(e) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                e.to_string(),
                Some(json!({ "retry_after": e.retry_after_secs })),
            ),
        };

        let body = ErrorEnvelope::single(current_request_id(), code, message, details);
        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited(e) = &self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(e.retry_after_secs));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (
                AppError::from(ValidationError::new("name", "is required")),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::from(ChatError::SessionNotFound), StatusCode::NOT_FOUND),
            (AppError::from(AuthError::Missing), StatusCode::UNAUTHORIZED),
            (
                AppError::from(RateLimitExceeded { retry_after_secs: 7 }),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                AppError::from(ChatError::Storage("disk I/O error".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AppError::from(ChatError::Timeout), StatusCode::SERVICE_UNAVAILABLE),
            (
                AppError::from(ChatError::Internal("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn rate_limited_sets_retry_after_header() {
        let response = AppError::from(RateLimitExceeded { retry_after_secs: 42 }).into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
