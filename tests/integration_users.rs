mod common;

use axum::http::StatusCode;
use common::{back_references, create_test_user, generate_unique_email, post, put, setup_test_app};
use serde_json::json;
use slateboard::modules::users::model::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_user_returns_no_credential(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let email = generate_unique_email();

    let (status, body) = post(
        app,
        "/api/users",
        json!({
            "name": "Ada Lovelace",
            "email": email,
            "password": "hunter22",
            "role": "teacher"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], email);
    assert_eq!(body["role"], "teacher");
    assert!(body.get("password").is_none());

    // The stored credential is hashed, never the plaintext.
    let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_ne!(stored, "hunter22");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_email_is_conflict(pool: PgPool) {
    let email = generate_unique_email();
    let body = json!({
        "name": "First",
        "email": email,
        "password": "hunter22"
    });

    let (status, _) = post(setup_test_app(pool.clone()), "/api/users", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(setup_test_app(pool.clone()), "/api/users", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains(&email));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_role_is_rejected(pool: PgPool) {
    let (status, _) = post(
        setup_test_app(pool),
        "/api/users",
        json!({
            "name": "Eve",
            "email": generate_unique_email(),
            "password": "hunter22",
            "role": "principal"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_missing_user_is_not_found(pool: PgPool) {
    let (status, _) = common::get(
        setup_test_app(pool),
        &format!("/api/users/{}", Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_without_password_preserves_hash(pool: PgPool) {
    let id = create_test_user(&pool, "Renamed Later", UserRole::Student).await;
    let before: String = sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();

    // Name and role change in one call, no password supplied.
    let (status, body) = put(
        setup_test_app(pool.clone()),
        &format!("/api/users/{id}"),
        json!({ "name": "Renamed", "role": "teacher" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["role"], "teacher");

    let after: String = sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(before, after);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_with_password_rehashes(pool: PgPool) {
    let id = create_test_user(&pool, "Rekeyed", UserRole::Student).await;

    let (status, _) = put(
        setup_test_app(pool.clone()),
        &format!("/api/users/{id}"),
        json!({ "password": "brand-new-pass" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_ne!(stored, "x");
    assert_ne!(stored, "brand-new-pass");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_user_detaches_from_rosters(pool: PgPool) {
    let student = create_test_user(&pool, "Leaving Student", UserRole::Student).await;
    let teacher = create_test_user(&pool, "Staying Teacher", UserRole::Teacher).await;

    let (status, body) = post(
        setup_test_app(pool.clone()),
        "/api/classrooms",
        json!({
            "name": "7A",
            "student_ids": [student],
            "teacher_ids": [teacher]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let classroom_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let (status, _) = common::delete(
        setup_test_app(pool.clone()),
        &format!("/api/users/{student}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The roster no longer references the deleted user.
    assert!(back_references(&pool, student).await.is_empty());
    let (status, body) = common::get(
        setup_test_app(pool.clone()),
        &format!("/api/classrooms/{classroom_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["students"].as_array().unwrap().len(), 0);
    assert_eq!(body["teachers"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_user_is_not_found(pool: PgPool) {
    let (status, _) = common::delete(
        setup_test_app(pool),
        &format!("/api/users/{}", Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attendance_appends_and_derives_aggregates(pool: PgPool) {
    let id = create_test_user(&pool, "Tracked Student", UserRole::Student).await;

    let (status, _) = post(
        setup_test_app(pool.clone()),
        &format!("/api/users/{id}/attendance"),
        json!({ "status": "present", "date": "2025-03-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        setup_test_app(pool.clone()),
        &format!("/api/users/{id}/attendance"),
        json!({ "status": "absent", "note": "sick", "date": "2025-03-11" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let records = body["attendance"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    // Ordered by date.
    assert_eq!(records[0]["status"], "present");
    assert_eq!(records[1]["status"], "absent");
    assert_eq!(records[1]["note"], "sick");

    assert_eq!(body["attendance_summary"]["present"], 1);
    assert_eq!(body["attendance_summary"]["absent"], 1);
    assert_eq!(body["attendance_summary"]["total"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attendance_for_missing_user_is_not_found(pool: PgPool) {
    let (status, _) = post(
        setup_test_app(pool),
        &format!("/api/users/{}/attendance", Uuid::new_v4()),
        json!({ "status": "present" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_filters_by_role(pool: PgPool) {
    create_test_user(&pool, "A Teacher", UserRole::Teacher).await;
    create_test_user(&pool, "A Student", UserRole::Student).await;

    let (status, body) = common::get(setup_test_app(pool.clone()), "/api/users?role=teacher").await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["role"], "teacher");
}
