#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use todo_api::app::build_app;
use todo_api::config::{AppConfig, JwtConfig};
use todo_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config(conceal_foreign_tasks: bool) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        database_max_connections: 1,
        jwt: JwtConfig {
            secret: TEST_SECRET.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        },
        conceal_foreign_tasks,
    }
}

/// Fresh in-memory database with the real migrations applied. A single
/// connection that never expires, since every `:memory:` connection is its
/// own database.
pub async fn test_state(conceal_foreign_tasks: bool) -> AppState {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let state = AppState::from_parts(db, Arc::new(test_config(conceal_foreign_tasks)));
    state.migrate().await.expect("migrations apply");
    state
}

pub async fn test_app() -> (Router, AppState) {
    let state = test_state(true).await;
    (build_app(state.clone()), state)
}

pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, json)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, token, body.map(|b| b.to_string())).await
}

pub async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

pub async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

/// Registers and logs in, returning `(user_id, access_token)`.
pub async fn signup(app: &Router, username: &str, password: &str) -> (String, String) {
    let (status, body) = register(app, username, password).await;
    assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login {username}: {body}");
    (
        body["user"]["id"].as_str().unwrap().to_string(),
        body["access_token"].as_str().unwrap().to_string(),
    )
}

pub async fn create_task(app: &Router, token: &str, body: Value) -> Value {
    let (status, task) = send(app, Method::POST, "/api/v1/tasks", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create task: {task}");
    task
}
