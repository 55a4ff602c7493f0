//! Chat session and message types for chatvault.
//!
//! A session is a named conversation thread; messages belong to exactly one
//! session and are returned in a stable total order (creation time, then
//! insertion sequence).

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named conversation thread.
///
/// Only `name` and `is_favorite` are mutable. `updated_at` moves forward
/// whenever one of them actually changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub name: String,
    /// Opaque owner tag supplied at creation. Not used for authorization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Build a fresh session record with a new id and `created_at == updated_at`.
    pub fn new(name: String, user_id: Option<String>) -> Self {
        let now = now_utc();
        Self {
            id: Uuid::now_v7(),
            name,
            user_id,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One turn of content within a session.
///
/// Messages are append-only: they are never updated and only disappear when
/// their owning session is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: String,
    pub content: String,
    /// Retrieval context attached by the caller. Stored verbatim.
    pub context: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// A validated message ready to be appended to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub role: String,
    pub content: String,
    pub context: Option<serde_json::Value>,
}

/// A validated partial update for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub name: Option<String>,
    pub is_favorite: Option<bool>,
}

impl SessionPatch {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_favorite.is_none()
    }
}

/// Offset-based page coordinates, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Number of records preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

/// One page of messages plus the data needed to walk the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub items: Vec<Message>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub has_more: bool,
}

impl MessagePage {
    pub fn new(items: Vec<Message>, request: PageRequest, total: u64) -> Self {
        let end = request.offset() + u64::from(request.page_size);
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
            has_more: end < total,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /chat/sessions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: Option<String>,
    #[serde(default, alias = "user_id")]
    pub user_id: Option<String>,
}

/// Body of `PUT`/`PATCH /chat/sessions/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "is_favorite")]
    pub is_favorite: Option<bool>,
}

/// Body of `POST /chat/sessions/{id}/messages`.
///
/// `sender` is accepted as an alias for `role`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageRequest {
    #[serde(default, alias = "sender")]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// Query string of `GET /chat/sessions/{id}/messages`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default, alias = "page_size")]
    pub page_size: Option<i64>,
}

/// Current UTC time truncated to microseconds, the precision timestamps are
/// persisted with.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
