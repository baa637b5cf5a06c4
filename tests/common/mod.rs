#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use slateboard::config::cors::CorsConfig;
use slateboard::modules::users::model::UserRole;
use slateboard::router::init_router;
use slateboard::state::AppState;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub fn setup_test_app(pool: PgPool) -> Router {
    let state = AppState {
        db: pool,
        cors_config: CorsConfig::default(),
    };
    init_router(state)
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Inserts a user directly; the password column is opaque to the core so
/// tests store a placeholder instead of paying for a real bcrypt hash.
pub async fn create_test_user(pool: &PgPool, name: &str, role: UserRole) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (name, email, password, role)
        VALUES ($1, $2, 'x', $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(generate_unique_email())
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Classroom ids a user is enrolled in or teaches, read straight from the
/// junction tables (the user-side back-references).
pub async fn back_references(pool: &PgPool, user_id: Uuid) -> Vec<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT classroom_id FROM classroom_students WHERE user_id = $1
        UNION
        SELECT classroom_id FROM classroom_teachers WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

pub async fn children_of(pool: &PgPool, parent_id: Uuid) -> Vec<Uuid> {
    sqlx::query_scalar::<_, Uuid>("SELECT child_id FROM user_children WHERE parent_id = $1")
        .bind(parent_id)
        .fetch_all(pool)
        .await
        .unwrap()
}

pub async fn request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

pub async fn post(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    request(app, "POST", uri, Some(body)).await
}

pub async fn put(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    request(app, "PUT", uri, Some(body)).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    request(app, "GET", uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    request(app, "DELETE", uri, None).await
}
