//! Router-level tests driving the full middleware stack over a temp database.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use chatvault_infra::sqlite::pool::DatabasePool;
use chatvault_types::config::ServiceConfig;

use crate::http::router::build_router;
use crate::state::AppState;

const API_KEY: &str = "test-key-3f9c";

struct TestApp {
    _dir: TempDir,
    router: Router,
    pool: DatabasePool,
}

async fn test_app_with(configure: impl FnOnce(&mut ServiceConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());
    let pool = DatabasePool::new(&url).await.unwrap();

    let mut config = ServiceConfig::default();
    config.auth.api_key = Some(SecretString::from(API_KEY.to_string()));
    configure(&mut config);

    let state = AppState::from_parts(config, pool.clone()).unwrap();
    let router = build_router(state).layer(MockConnectInfo(SocketAddr::from((
        [127, 0, 0, 1],
        40000,
    ))));

    TestApp {
        _dir: dir,
        router,
        pool,
    }
}

async fn test_app() -> TestApp {
    test_app_with(|c| c.rate_limit.max_requests = 1000).await
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", API_KEY);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.send(request(method, uri, body)).await;
        read_json(response).await
    }

    async fn session_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM chat_sessions")
            .fetch_one(&self.pool.reader)
            .await
            .unwrap()
    }
}

async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn error_code(body: &Value) -> &str {
    body["errors"][0]["code"].as_str().unwrap()
}

#[tokio::test]
async fn session_and_message_lifecycle() {
    let app = test_app().await;

    let (status, session) = app
        .call(Method::POST, "/chat/sessions", Some(json!({"name": "demo"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["name"], "demo");
    assert_eq!(session["isFavorite"], false);
    assert_eq!(session["createdAt"], session["updatedAt"]);
    let id = session["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.call(Method::GET, &format!("/chat/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, session);

    let (status, first) = app
        .call(
            Method::POST,
            &format!("/chat/sessions/{id}/messages"),
            Some(json!({"role": "user", "content": "hello"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["sessionId"], id.as_str());

    let context = json!({"passages": [{"source": "faq.md", "text": "hi there"}]});
    let (status, second) = app
        .call(
            Method::POST,
            &format!("/chat/sessions/{id}/messages"),
            Some(json!({"sender": "assistant", "content": "hi", "context": context})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["role"], "assistant");

    let (status, page) = app
        .call(
            Method::GET,
            &format!("/chat/sessions/{id}/messages?page=1&pageSize=10"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["hasMore"], false);
    assert_eq!(page["items"][0]["content"], "hello");
    assert_eq!(page["items"][1]["content"], "hi");
    assert_eq!(page["items"][1]["context"], context);

    let (status, updated) = app
        .call(
            Method::PATCH,
            &format!("/chat/sessions/{id}"),
            Some(json!({"isFavorite": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isFavorite"], true);
    assert_eq!(updated["name"], "demo");
    assert_ne!(updated["updatedAt"], session["updatedAt"]);

    let response = app
        .send(request(Method::DELETE, &format!("/chat/sessions/{id}"), None))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let (_, body) = read_json(response).await;
    assert_eq!(body, Value::Null);

    let (status, body) = app.call(Method::GET, &format!("/chat/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "SESSION_NOT_FOUND");

    let (status, body) = app
        .call(Method::GET, &format!("/chat/sessions/{id}/messages"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn put_without_fields_returns_session_unchanged() {
    let app = test_app().await;
    let (_, session) = app
        .call(Method::POST, "/chat/sessions", Some(json!({"name": "same"})))
        .await;
    let id = session["id"].as_str().unwrap();

    let (status, body) = app
        .call(Method::PUT, &format!("/chat/sessions/{id}"), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, session);
}

#[tokio::test]
async fn unauthorized_requests_change_nothing() {
    let app = test_app().await;

    let missing = Request::builder()
        .method(Method::POST)
        .uri("/chat/sessions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"name": "x"}).to_string()))
        .unwrap();
    let (status, body) = read_json(app.send(missing).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");

    let wrong = Request::builder()
        .method(Method::POST)
        .uri("/chat/sessions")
        .header("x-api-key", "test-key-3f9d")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"name": "x"}).to_string()))
        .unwrap();
    let (status, _) = read_json(app.send(wrong).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.session_count().await, 0);
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let app = test_app().await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/chat/sessions")
        .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"name": "via bearer"}).to_string()))
        .unwrap();
    let (status, _) = read_json(app.send(req).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.session_count().await, 1);
}

#[tokio::test]
async fn eleventh_request_in_window_is_rate_limited() {
    let app = test_app_with(|_| {}).await;
    let uri = format!("/chat/sessions/{}", uuid::Uuid::now_v7());

    for _ in 0..10 {
        let (status, _) = app.call(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let response = app.send(request(Method::GET, &uri, None)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    let (_, body) = read_json(response).await;
    assert_eq!(error_code(&body), "RATE_LIMITED");
    assert_eq!(body["errors"][0]["details"]["retry_after"], retry_after);
}

#[tokio::test]
async fn rejected_credentials_do_not_consume_quota() {
    let app = test_app_with(|c| c.rate_limit.max_requests = 2).await;

    for _ in 0..5 {
        let req = Request::builder()
            .uri("/chat/sessions/not-checked")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(req).await.status(), StatusCode::UNAUTHORIZED);
    }

    let uri = format!("/chat/sessions/{}", uuid::Uuid::now_v7());
    for _ in 0..2 {
        let (status, _) = app.call(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = app.call(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn forwarded_for_keys_clients_when_trusted() {
    let app = test_app_with(|c| {
        c.rate_limit.max_requests = 1;
        c.rate_limit.trust_forwarded_for = true;
    })
    .await;

    let from = |ip: &str| {
        let mut req = request(Method::GET, "/chat/sessions/00000000-0000-0000-0000-000000000000", None);
        req.headers_mut()
            .insert("x-forwarded-for", ip.parse().unwrap());
        req
    };

    assert_eq!(app.send(from("198.51.100.1")).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.send(from("198.51.100.1")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(app.send(from("198.51.100.2")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disabled_limiter_admits_everything() {
    let app = test_app_with(|c| {
        c.rate_limit.enabled = false;
        c.rate_limit.max_requests = 1;
    })
    .await;
    let uri = format!("/chat/sessions/{}", uuid::Uuid::now_v7());
    for _ in 0..5 {
        let (status, _) = app.call(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let app = test_app_with(|c| c.rate_limit.max_requests = 1).await;
    for _ in 0..3 {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = read_json(app.send(req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

#[tokio::test]
async fn validation_errors_name_the_field() {
    let app = test_app().await;

    let (status, body) = app
        .call(Method::POST, "/chat/sessions", Some(json!({"name": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
    assert_eq!(body["errors"][0]["details"]["field"], "name");

    let (status, body) = app.call(Method::GET, "/chat/sessions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["details"]["field"], "sessionId");

    let (_, session) = app
        .call(Method::POST, "/chat/sessions", Some(json!({"name": "ok"})))
        .await;
    let id = session["id"].as_str().unwrap();

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/chat/sessions/{id}/messages?pageSize=0"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["details"]["field"], "pageSize");

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/chat/sessions/{id}/messages"),
            Some(json!({"role": "user", "content": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["details"]["field"], "content");

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/chat/sessions")
        .header("x-api-key", API_KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = read_json(app.send(malformed).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    // Only the one valid session was written.
    assert_eq!(app.session_count().await, 1);
}

#[tokio::test]
async fn add_message_to_missing_session_is_not_found() {
    let app = test_app().await;
    let (status, body) = app
        .call(
            Method::POST,
            &format!("/chat/sessions/{}/messages", uuid::Uuid::now_v7()),
            Some(json!({"role": "user", "content": "anyone?"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn request_id_is_echoed_in_header_and_error_body() {
    let app = test_app().await;

    let mut req = request(Method::GET, "/chat/sessions/not-a-uuid", None);
    req.headers_mut()
        .insert("x-request-id", "trace-abc-123".parse().unwrap());
    let response = app.send(req).await;
    assert_eq!(response.headers()["x-request-id"], "trace-abc-123");
    let (_, body) = read_json(response).await;
    assert_eq!(body["meta"]["request_id"], "trace-abc-123");

    let response = app.send(request(Method::GET, "/health", None)).await;
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn pagination_walks_all_messages_in_order() {
    let app = test_app().await;
    let (_, session) = app
        .call(Method::POST, "/chat/sessions", Some(json!({"name": "long"})))
        .await;
    let id = session["id"].as_str().unwrap();

    for i in 0..5 {
        let (status, _) = app
            .call(
                Method::POST,
                &format!("/chat/sessions/{id}/messages"),
                Some(json!({"role": "user", "content": format!("m{i}")})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let mut contents = Vec::new();
    for page in 1..=3 {
        let (status, body) = app
            .call(
                Method::GET,
                &format!("/chat/sessions/{id}/messages?page={page}&pageSize=2"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasMore"], page < 3);
        for item in body["items"].as_array().unwrap() {
            contents.push(item["content"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4"]);
}
