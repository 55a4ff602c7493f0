//! SQLite chat store implementation.
//!
//! Implements `ChatStore` from `chatvault-core` using sqlx with split read/write
//! pools: raw queries, private Row structs, and one transaction per logical
//! operation. Deleting a session relies on the `ON DELETE CASCADE` foreign key
//! on `messages`, executed inside the same transaction as the session delete.

use chatvault_core::chat::repository::ChatStore;
use chatvault_core::chat::session::apply_patch;
use chatvault_types::chat::{
    now_utc, ChatSession, Message, MessagePage, PageRequest, SessionPatch,
};
use chatvault_types::error::RepositoryError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatStore`.
pub struct SqliteChatStore {
    pool: DatabasePool,
}

impl SqliteChatStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    id: String,
    name: String,
    user_id: Option<String>,
    is_favorite: bool,
    created_at: String,
    updated_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            user_id: row.try_get("user_id")?,
            is_favorite: row.try_get("is_favorite")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;

        Ok(ChatSession {
            id,
            name: self.name,
            user_id: self.user_id,
            is_favorite: self.is_favorite,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    context: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            context: row.try_get("context")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;
        let context = self
            .context
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid message context: {e}")))?;

        Ok(Message {
            id,
            session_id,
            role: self.role,
            content: self.content,
            context,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 (microseconds, `Z`), so text order equals time order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Classify sqlx failures: pool and I/O problems are transient, the rest are not.
fn map_sqlx(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection(e.to_string())
        }
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        other => RepositoryError::Query(other.to_string()),
    }
}

async fn session_exists(
    conn: &mut sqlx::SqliteConnection,
    session_id: &Uuid,
) -> Result<bool, RepositoryError> {
    let row = sqlx::query("SELECT 1 FROM chat_sessions WHERE id = ?")
        .bind(session_id.to_string())
        .fetch_optional(conn)
        .await
        .map_err(map_sqlx)?;
    Ok(row.is_some())
}

// ---------------------------------------------------------------------------
// ChatStore implementation
// ---------------------------------------------------------------------------

impl ChatStore for SqliteChatStore {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (id, name, user_id, is_favorite, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(&session.name)
        .bind(&session.user_id)
        .bind(session.is_favorite)
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row).map_err(map_sqlx)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update_session(
        &self,
        session_id: &Uuid,
        patch: &SessionPatch,
    ) -> Result<ChatSession, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx)?;

        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx)?
            .ok_or(RepositoryError::NotFound)?;
        let mut session = ChatSessionRow::from_row(&row)
            .map_err(map_sqlx)?
            .into_session()?;

        if apply_patch(&mut session, patch, now_utc()) {
            sqlx::query(
                "UPDATE chat_sessions SET name = ?, is_favorite = ?, updated_at = ? WHERE id = ?",
            )
            .bind(&session.name)
            .bind(session.is_favorite)
            .bind(format_datetime(&session.updated_at))
            .bind(session.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(session)
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx)?;

        // Messages go with the session through the ON DELETE CASCADE foreign key.
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn append_message(&self, message: &Message) -> Result<Message, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx)?;

        if !session_exists(&mut *tx, &message.session_id).await? {
            return Err(RepositoryError::NotFound);
        }

        let newest: Option<String> =
            sqlx::query_scalar("SELECT MAX(created_at) FROM messages WHERE session_id = ?")
                .bind(message.session_id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx)?;

        let mut stored = message.clone();
        if let Some(newest) = newest {
            let newest = parse_datetime(&newest)?;
            if newest > stored.created_at {
                stored.created_at = newest;
            }
        }

        let context = stored
            .context
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("unserializable context: {e}")))?;

        sqlx::query(
            r#"INSERT INTO messages (id, session_id, role, content, context, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(stored.id.to_string())
        .bind(stored.session_id.to_string())
        .bind(&stored.role)
        .bind(&stored.content)
        .bind(context)
        .bind(format_datetime(&stored.created_at))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;
        Ok(stored)
    }

    async fn list_messages(
        &self,
        session_id: &Uuid,
        page: PageRequest,
    ) -> Result<MessagePage, RepositoryError> {
        // One read transaction so the count and the page come from the same snapshot.
        let mut tx = self.pool.reader.begin().await.map_err(map_sqlx)?;

        if !session_exists(&mut *tx, session_id).await? {
            return Err(RepositoryError::NotFound);
        }

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        let rows = sqlx::query(
            r#"SELECT id, session_id, role, content, context, created_at
               FROM messages
               WHERE session_id = ?
               ORDER BY created_at ASC, seq ASC
               LIMIT ? OFFSET ?"#,
        )
        .bind(session_id.to_string())
        .bind(i64::from(page.page_size))
        .bind(page.offset() as i64)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(map_sqlx)?;
            items.push(msg_row.into_message()?);
        }

        Ok(MessagePage::new(items, page, total as u64))
    }
}
