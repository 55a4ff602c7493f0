//! Infrastructure layer for chatvault.
//!
//! Contains the SQLite implementation of the `ChatStore` trait defined in
//! `chatvault-core`, plus the configuration loader (TOML file, `.env`, and
//! environment overrides).

pub mod config;
pub mod sqlite;
