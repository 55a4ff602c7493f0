//! ChatStore trait definition.
//!
//! Provides the persistence operations for sessions and their messages.
//! Every method is one atomic unit of work in the backing store.

use chatvault_types::chat::{ChatSession, Message, MessagePage, PageRequest, SessionPatch};
use chatvault_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
///
/// Implementations live in chatvault-infra (e.g., `SqliteChatStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatStore: Send + Sync {
    /// Insert a new chat session.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Apply a patch to a session and return the stored result.
    ///
    /// Implementations read, patch (see [`apply_patch`](super::session::apply_patch))
    /// and write inside one transaction. Returns `NotFound` if the session is absent.
    fn update_session(
        &self,
        session_id: &Uuid,
        patch: &SessionPatch,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Delete a session together with all of its messages.
    ///
    /// Returns `NotFound` if the session is absent.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a message to its session.
    ///
    /// Returns `NotFound` (and writes nothing) if the session does not exist.
    /// The stored `created_at` is never earlier than the session's newest
    /// message, so the returned record may carry an adjusted timestamp.
    fn append_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;

    /// Get one page of a session's messages ordered by `created_at`, then
    /// insertion sequence.
    ///
    /// Returns `NotFound` if the session does not exist.
    fn list_messages(
        &self,
        session_id: &Uuid,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<MessagePage, RepositoryError>> + Send;
}
