//! Chat session and message persistence abstractions.
//!
//! `repository` defines the `ChatStore` trait the infrastructure layer
//! implements; `service` wraps it with timeouts and read retries.

pub mod repository;
pub mod service;
pub mod session;
