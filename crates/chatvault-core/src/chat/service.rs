//! Chat service fronting the session and message store.
//!
//! ChatService takes already-validated inputs (see `chatvault_types::validate`)
//! and runs each store operation under the configured timeout. Reads that
//! fail transiently are retried a bounded number of times; writes never are,
//! so a message can't be inserted twice.

use std::future::Future;
use std::time::Duration;

use chatvault_types::chat::{
    now_utc, ChatSession, Message, MessagePage, NewMessage, PageRequest, SessionPatch,
};
use chatvault_types::config::StoreConfig;
use chatvault_types::error::{ChatError, RepositoryError};
use chatvault_types::validate::NewSession;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::repository::ChatStore;

/// Base delay between read attempts; attempt `n` waits `n * RETRY_BACKOFF`.
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Orchestrates session and message persistence.
///
/// Generic over `ChatStore` to maintain clean architecture
/// (chatvault-core never depends on chatvault-infra).
pub struct ChatService<S: ChatStore> {
    store: S,
    operation_timeout: Duration,
    read_retries: u32,
}

impl<S: ChatStore> ChatService<S> {
    pub fn new(store: S, config: &StoreConfig) -> Self {
        Self {
            store,
            operation_timeout: config.operation_timeout(),
            read_retries: config.read_retries,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Sessions ---

    pub async fn create_session(&self, new: NewSession) -> Result<ChatSession, ChatError> {
        let session = ChatSession::new(new.name, new.user_id);
        let created = self
            .bounded("create_session", self.store.create_session(&session))
            .await?;
        info!(session_id = %created.id, "session created");
        Ok(created)
    }

    pub async fn get_session(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        self.read_with_retry("get_session", || self.store.get_session(session_id))
            .await?
            .ok_or(ChatError::SessionNotFound)
    }

    pub async fn update_session(
        &self,
        session_id: &Uuid,
        patch: SessionPatch,
    ) -> Result<ChatSession, ChatError> {
        let updated = self
            .bounded("update_session", self.store.update_session(session_id, &patch))
            .await?;
        info!(
            session_id = %session_id,
            renamed = patch.name.is_some(),
            favorite = ?patch.is_favorite,
            "session updated"
        );
        Ok(updated)
    }

    /// Delete a session and, atomically, every message it owns.
    pub async fn delete_session(&self, session_id: &Uuid) -> Result<(), ChatError> {
        self.bounded("delete_session", self.store.delete_session(session_id))
            .await?;
        info!(session_id = %session_id, "session deleted");
        Ok(())
    }

    // --- Messages ---

    pub async fn add_message(
        &self,
        session_id: &Uuid,
        new: NewMessage,
    ) -> Result<Message, ChatError> {
        let message = Message {
            id: Uuid::now_v7(),
            session_id: *session_id,
            role: new.role,
            content: new.content,
            context: new.context,
            created_at: now_utc(),
        };
        let stored = self
            .bounded("append_message", self.store.append_message(&message))
            .await?;
        info!(session_id = %session_id, message_id = %stored.id, role = %stored.role, "message added");
        Ok(stored)
    }

    pub async fn list_messages(
        &self,
        session_id: &Uuid,
        page: PageRequest,
    ) -> Result<MessagePage, ChatError> {
        let result = self
            .read_with_retry("list_messages", || self.store.list_messages(session_id, page))
            .await?;
        Ok(result)
    }

    // --- Helpers ---

    /// Run one store operation under the configured timeout.
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, RepositoryError> {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(op, timeout_ms = self.operation_timeout.as_millis() as u64, "store operation timed out");
                Err(RepositoryError::Timeout)
            }
        }
    }

    /// Run a read, retrying transient failures up to `read_retries` extra times.
    async fn read_with_retry<T, F, Fut>(
        &self,
        op: &'static str,
        mut attempt_fn: F,
    ) -> Result<T, RepositoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RepositoryError>>,
    {
        let mut attempt = 0;
        loop {
            match self.bounded(op, attempt_fn()).await {
                Err(e) if e.is_transient() && attempt < self.read_retries => {
                    attempt += 1;
                    warn!(op, attempt, error = %e, "transient store error, retrying read");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                other => return other,
            }
        }
    }
}
