//! HTTP request handlers for the chat API.

pub mod message;
pub mod session;
