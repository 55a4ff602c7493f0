//! Per-operation request validation.
//!
//! Each function takes the raw wire request plus the configured limits and
//! returns either a validated value for the service layer or the first
//! field-level [`ValidationError`] it finds. Nothing here depends on how the
//! request was bound from HTTP.

use uuid::Uuid;

use crate::chat::{
    AddMessageRequest, CreateSessionRequest, ListMessagesQuery, NewMessage, PageRequest,
    SessionPatch, UpdateSessionRequest,
};
use crate::config::LimitsConfig;
use crate::error::ValidationError;

/// A validated session creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub name: String,
    pub user_id: Option<String>,
}

pub fn validate_session_id(raw: &str) -> Result<Uuid, ValidationError> {
    raw.trim()
        .parse::<Uuid>()
        .map_err(|_| ValidationError::new("sessionId", format!("invalid session id: '{raw}'")))
}

fn validate_name(name: &str, limits: &LimitsConfig) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "must not be empty"));
    }
    let len = name.chars().count();
    if len > limits.max_name_length {
        return Err(ValidationError::new(
            "name",
            format!("must be at most {} characters (got {len})", limits.max_name_length),
        ));
    }
    Ok(name.to_string())
}

pub fn validate_create_session(
    req: CreateSessionRequest,
    limits: &LimitsConfig,
) -> Result<NewSession, ValidationError> {
    let name = match req.name {
        Some(name) => validate_name(&name, limits)?,
        None => return Err(ValidationError::new("name", "is required")),
    };

    let user_id = match req.user_id {
        Some(user_id) => {
            let user_id = user_id.trim();
            if user_id.is_empty() {
                return Err(ValidationError::new("userId", "must not be empty when present"));
            }
            if user_id.chars().count() > limits.max_name_length {
                return Err(ValidationError::new(
                    "userId",
                    format!("must be at most {} characters", limits.max_name_length),
                ));
            }
            Some(user_id.to_string())
        }
        None => None,
    };

    Ok(NewSession { name, user_id })
}

pub fn validate_update_session(
    req: UpdateSessionRequest,
    limits: &LimitsConfig,
) -> Result<SessionPatch, ValidationError> {
    let name = req.name.map(|n| validate_name(&n, limits)).transpose()?;
    Ok(SessionPatch {
        name,
        is_favorite: req.is_favorite,
    })
}

pub fn validate_add_message(
    req: AddMessageRequest,
    limits: &LimitsConfig,
) -> Result<NewMessage, ValidationError> {
    let role = req
        .role
        .map(|r| r.trim().to_string())
        .unwrap_or_default();
    if role.is_empty() {
        return Err(ValidationError::new("role", "is required"));
    }
    if role.chars().count() > limits.max_role_length {
        return Err(ValidationError::new(
            "role",
            format!("must be at most {} characters", limits.max_role_length),
        ));
    }

    let content = req.content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(ValidationError::new("content", "must not be empty"));
    }
    if content.len() > limits.max_content_length {
        return Err(ValidationError::new(
            "content",
            format!("must be at most {} bytes", limits.max_content_length),
        ));
    }

    let context = match req.context {
        None | Some(serde_json::Value::Null) => None,
        Some(value @ serde_json::Value::Object(_)) => Some(value),
        Some(_) => {
            return Err(ValidationError::new("context", "must be a JSON object or null"));
        }
    };

    Ok(NewMessage {
        role,
        content,
        context,
    })
}

pub fn validate_page(
    query: ListMessagesQuery,
    limits: &LimitsConfig,
) -> Result<PageRequest, ValidationError> {
    let page = query.page.unwrap_or(1);
    if page < 1 || page > i64::from(u32::MAX) {
        return Err(ValidationError::new("page", "must be a positive integer"));
    }

    let page_size = query
        .page_size
        .unwrap_or_else(|| i64::from(limits.default_page_size));
    if page_size < 1 || page_size > i64::from(limits.max_page_size) {
        return Err(ValidationError::new(
            "pageSize",
            format!("must be between 1 and {}", limits.max_page_size),
        ));
    }

    Ok(PageRequest {
        page: page as u32,
        page_size: page_size as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    #[test]
    fn test_create_session_trims_name() {
        let req = CreateSessionRequest {
            name: Some("  demo  ".to_string()),
            user_id: None,
        };
        let session = validate_create_session(req, &limits()).unwrap();
        assert_eq!(session.name, "demo");
    }

    #[test]
    fn test_create_session_rejects_missing_and_blank_name() {
        let err = validate_create_session(CreateSessionRequest::default(), &limits()).unwrap_err();
        assert_eq!(err.field, "name");

        let req = CreateSessionRequest {
            name: Some("   ".to_string()),
            user_id: None,
        };
        assert_eq!(validate_create_session(req, &limits()).unwrap_err().field, "name");
    }

    #[test]
    fn test_create_session_rejects_long_name() {
        let req = CreateSessionRequest {
            name: Some("x".repeat(201)),
            user_id: None,
        };
        let err = validate_create_session(req, &limits()).unwrap_err();
        assert!(err.message.contains("200"));

        let req = CreateSessionRequest {
            name: Some("é".repeat(200)),
            user_id: None,
        };
        assert!(validate_create_session(req, &limits()).is_ok());
    }

    #[test]
    fn test_create_session_rejects_blank_user_id() {
        let req = CreateSessionRequest {
            name: Some("demo".to_string()),
            user_id: Some(" ".to_string()),
        };
        assert_eq!(validate_create_session(req, &limits()).unwrap_err().field, "userId");
    }

    #[test]
    fn test_update_session_allows_empty_patch() {
        let patch = validate_update_session(UpdateSessionRequest::default(), &limits()).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_update_session_validates_name() {
        let req = UpdateSessionRequest {
            name: Some(String::new()),
            is_favorite: Some(true),
        };
        assert_eq!(validate_update_session(req, &limits()).unwrap_err().field, "name");
    }

    #[test]
    fn test_add_message_requires_role_and_content() {
        let req = AddMessageRequest {
            role: None,
            content: Some("hi".to_string()),
            context: None,
        };
        assert_eq!(validate_add_message(req, &limits()).unwrap_err().field, "role");

        let req = AddMessageRequest {
            role: Some("user".to_string()),
            content: Some(" ".to_string()),
            context: None,
        };
        assert_eq!(validate_add_message(req, &limits()).unwrap_err().field, "content");
    }

    #[test]
    fn test_add_message_context_must_be_object() {
        let req = AddMessageRequest {
            role: Some("assistant".to_string()),
            content: Some("answer".to_string()),
            context: Some(json!(["passage"])),
        };
        assert_eq!(validate_add_message(req, &limits()).unwrap_err().field, "context");

        let req = AddMessageRequest {
            role: Some("assistant".to_string()),
            content: Some("answer".to_string()),
            context: Some(json!({"passages": ["a", "b"]})),
        };
        let msg = validate_add_message(req, &limits()).unwrap();
        assert_eq!(msg.context, Some(json!({"passages": ["a", "b"]})));
    }

    #[test]
    fn test_page_defaults() {
        let page = validate_page(ListMessagesQuery::default(), &limits()).unwrap();
        assert_eq!(page, PageRequest { page: 1, page_size: 10 });
    }

    #[test]
    fn test_page_bounds() {
        let zero = ListMessagesQuery {
            page: Some(0),
            page_size: None,
        };
        assert_eq!(validate_page(zero, &limits()).unwrap_err().field, "page");

        let too_big = ListMessagesQuery {
            page: Some(1),
            page_size: Some(101),
        };
        assert_eq!(validate_page(too_big, &limits()).unwrap_err().field, "pageSize");

        let max = ListMessagesQuery {
            page: Some(7),
            page_size: Some(100),
        };
        assert_eq!(
            validate_page(max, &limits()).unwrap(),
            PageRequest { page: 7, page_size: 100 }
        );
    }

    #[test]
    fn test_session_id_parsing() {
        let id = Uuid::now_v7();
        assert_eq!(validate_session_id(&id.to_string()).unwrap(), id);
        assert_eq!(validate_session_id("not-a-uuid").unwrap_err().field, "sessionId");
    }
}
