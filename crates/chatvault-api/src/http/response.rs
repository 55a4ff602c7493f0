//! Envelope format for error responses.
//!
//! Successful responses carry the bare entity. Errors are wrapped in:
//! ```json
//! {
//!   "meta": { "request_id": "...", "timestamp": "..." },
//!   "errors": [{ "code": "...", "message": "...", "details": { ... } }]
//! }
//! ```

use serde::Serialize;

/// Envelope wrapping one or more errors.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Request metadata.
    pub meta: ApiMeta,

    /// Error list, never empty.
    pub errors: Vec<ApiErrorDetail>,
}

/// Metadata included in every error response.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Request identifier, also sent as the `X-Request-Id` header.
    pub request_id: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Individual error detail.
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code.
    pub code: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Additional context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    pub fn single(
        request_id: String,
        code: &'static str,
        message: String,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            meta: ApiMeta {
                request_id,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            errors: vec![ApiErrorDetail {
                code,
                message,
                details,
            }],
        }
    }
}
