//! Session CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST   /chat/sessions       - Create a session
//! - GET    /chat/sessions/{id}  - Get a single session
//! - PUT    /chat/sessions/{id}  - Rename and/or (un)favorite a session
//! - PATCH  /chat/sessions/{id}  - Same as PUT
//! - DELETE /chat/sessions/{id}  - Delete a session and all its messages

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use chatvault_types::chat::{ChatSession, CreateSessionRequest, UpdateSessionRequest};
use chatvault_types::validate::{validate_create_session, validate_update_session};

use crate::http::error::AppError;
use crate::http::extractors::{ApiJson, SessionId};
use crate::state::AppState;

/// POST /chat/sessions - Create a session.
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ChatSession>), AppError> {
    let new = validate_create_session(req, &state.config.limits)?;
    let session = state.chat_service.create_session(new).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /chat/sessions/{id} - Get a session by ID.
pub async fn get_session(
    State(state): State<AppState>,
    SessionId(id): SessionId,
) -> Result<Json<ChatSession>, AppError> {
    let session = state.chat_service.get_session(&id).await?;
    Ok(Json(session))
}

/// PUT|PATCH /chat/sessions/{id} - Update name and/or favorite flag.
///
/// A body with neither field returns the session unchanged.
pub async fn update_session(
    State(state): State<AppState>,
    SessionId(id): SessionId,
    ApiJson(req): ApiJson<UpdateSessionRequest>,
) -> Result<Json<ChatSession>, AppError> {
    let patch = validate_update_session(req, &state.config.limits)?;
    let session = if patch.is_empty() {
        state.chat_service.get_session(&id).await?
    } else {
        state.chat_service.update_session(&id, patch).await?
    };
    Ok(Json(session))
}

/// DELETE /chat/sessions/{id} - Delete a session with its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    SessionId(id): SessionId,
) -> Result<StatusCode, AppError> {
    state.chat_service.delete_session(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
