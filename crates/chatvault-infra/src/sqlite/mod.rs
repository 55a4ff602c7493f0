//! SQLite storage layer.
//!
//! Chat persistence backed by SQLite with WAL mode and split read/write
//! connection pools.

pub mod chat;
pub mod pool;
