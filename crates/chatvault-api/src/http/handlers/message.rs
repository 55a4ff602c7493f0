//! Message HTTP handlers.
//!
//! Endpoints:
//! - POST /chat/sessions/{id}/messages                  - Append a message
//! - GET  /chat/sessions/{id}/messages?page=&pageSize=  - List messages, oldest first

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use chatvault_types::chat::{AddMessageRequest, ListMessagesQuery, Message, MessagePage};
use chatvault_types::validate::{validate_add_message, validate_page};

use crate::http::error::AppError;
use crate::http::extractors::{ApiJson, ApiQuery, SessionId};
use crate::state::AppState;

/// POST /chat/sessions/{id}/messages - Append a message to a session.
pub async fn add_message(
    State(state): State<AppState>,
    SessionId(id): SessionId,
    ApiJson(req): ApiJson<AddMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let new = validate_add_message(req, &state.config.limits)?;
    let message = state.chat_service.add_message(&id, new).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /chat/sessions/{id}/messages - One page of a session's messages.
pub async fn list_messages(
    State(state): State<AppState>,
    SessionId(id): SessionId,
    ApiQuery(query): ApiQuery<ListMessagesQuery>,
) -> Result<Json<MessagePage>, AppError> {
    let page = validate_page(query, &state.config.limits)?;
    let result = state.chat_service.list_messages(&id, page).await?;
    Ok(Json(result))
}
