//! Shared domain types for chatvault.
//!
//! This crate contains the types used across the service: chat sessions,
//! messages, pages, request bodies and their validation, configuration, and
//! the error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod chat;
pub mod config;
pub mod error;
pub mod validate;
