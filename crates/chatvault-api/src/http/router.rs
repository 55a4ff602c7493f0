//! Axum router configuration with middleware.
//!
//! Chat routes live under `/chat/sessions` and pass through the API key
//! gateway first, then the rate limiter. `/health` bypasses both.
//! Outer middleware: request id, CORS, tracing.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::http::middleware::auth::require_api_key;
use crate::http::middleware::rate_limit::enforce_rate_limit;
use crate::http::middleware::request_id::{request_id, X_REQUEST_ID};
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([X_REQUEST_ID.clone()]);

    // Layers run outermost-last: the gateway wraps the limiter.
    let chat_routes = Router::new()
        .route("/chat/sessions", post(handlers::session::create_session))
        .route(
            "/chat/sessions/{id}",
            get(handlers::session::get_session)
                .put(handlers::session::update_session)
                .patch(handlers::session::update_session)
                .delete(handlers::session::delete_session),
        )
        .route(
            "/chat/sessions/{id}/messages",
            post(handlers::message::add_message).get(handlers::message::list_messages),
        )
        .route_layer(from_fn_with_state(state.clone(), enforce_rate_limit))
        .route_layer(from_fn_with_state(state.clone(), require_api_key));

    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        let request_id = req
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/health", get(health_check))
        .merge(chat_routes)
        .layer(trace)
        .layer(cors)
        .layer(from_fn(request_id))
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
