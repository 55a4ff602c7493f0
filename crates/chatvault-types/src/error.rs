use thiserror::Error;

/// A request field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as it appears on the wire.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors from repository operations (used by trait definitions in chatvault-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("store operation timed out")]
    Timeout,
}

impl RepositoryError {
    /// Whether a read that failed with this error may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::Connection(_) | RepositoryError::Timeout)
    }
}

/// Errors surfaced by the chat service to callers.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("session not found")]
    SessionNotFound,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("store operation timed out")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::SessionNotFound,
            RepositoryError::Timeout => ChatError::Timeout,
            RepositoryError::Connection(msg) | RepositoryError::Query(msg) => {
                ChatError::Storage(msg)
            }
        }
    }
}

/// A request was rejected by the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limit exceeded, retry after {retry_after_secs} second(s)")]
pub struct RateLimitExceeded {
    /// Whole seconds until the current window closes, at least 1.
    pub retry_after_secs: u64,
}

/// A request was rejected by the access gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing API key")]
    Missing,

    #[error("invalid API key")]
    Invalid,
}
