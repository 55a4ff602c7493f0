//! Business logic and repository trait definitions for chatvault.
//!
//! This crate defines the "ports" (the `ChatStore` trait) that the
//! infrastructure layer implements, plus the two request guards: the
//! shared-secret gateway and the per-address rate limiter. It depends only on
//! `chatvault-types` -- never on `chatvault-infra` or any database/IO crate.

pub mod auth;
pub mod chat;
pub mod ratelimit;
