//! HTTP/REST API layer for chatvault.
//!
//! Axum-based REST API under `/chat/sessions` with API key authentication,
//! per-address rate limiting, and an error envelope format.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;

#[cfg(test)]
mod tests;
