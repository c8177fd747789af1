//! Shared helpers for HTTP-level integration tests.
//!
//! `build_test_app` goes through [`grantflow_api::router::build_app_router`]
//! so tests exercise the exact middleware stack production uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tower::ServiceExt;

use grantflow_api::config::ServerConfig;
use grantflow_api::router::build_app_router;
use grantflow_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    request_with_json(app, "POST", uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    request_with_json(app, "PUT", uri, body).await
}

pub async fn delete_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    request_with_json(app, "DELETE", uri, body).await
}

async fn request_with_json(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Parse a JSON field (rust_decimal serializes as a string) into a `Decimal`.
pub fn as_decimal(value: &serde_json::Value) -> Decimal {
    serde_json::from_value(value.clone()).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub async fn seed_user(pool: &PgPool, email: &str, monthly_salary: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, monthly_salary)
         VALUES ($1, $2, $3::NUMERIC) RETURNING id",
    )
    .bind(email.split('@').next().unwrap())
    .bind(email)
    .bind(monthly_salary)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_project(pool: &PgPool, name: &str, eti_rate: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO projects (name, eti_rate, financing_rate, start_date, end_date)
         VALUES ($1, $2::NUMERIC, 0.85, '2025-01-01', '2026-12-31') RETURNING id",
    )
    .bind(name)
    .bind(eti_rate)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_workpackage(pool: &PgPool, project_id: i64, name: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO workpackages (project_id, name) VALUES ($1, $2) RETURNING id",
    )
    .bind(project_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}
