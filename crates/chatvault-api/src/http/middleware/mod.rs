//! Request pipeline middleware: request ids, the API key gateway, and the
//! per-address rate limiter.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
