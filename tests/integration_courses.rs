mod common;

use axum::http::StatusCode;
use common::{create_test_user, get, post, setup_test_app};
use serde_json::json;
use slateboard::modules::users::model::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

async fn create_classroom(pool: &PgPool, name: &str) -> Uuid {
    let (status, body) = post(
        setup_test_app(pool.clone()),
        "/api/classrooms",
        json!({ "name": name }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().parse().unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_denormalizes_creator(pool: PgPool) {
    let teacher = create_test_user(&pool, "Teacher T", UserRole::Teacher).await;
    let classroom_id = create_classroom(&pool, "7A").await;

    let (status, body) = post(
        setup_test_app(pool.clone()),
        "/api/courses",
        json!({
            "title": "Algebra",
            "description": "Linear equations",
            "created_by": teacher,
            "classroom_id": classroom_id,
            "files": ["/uploads/courses/week1.pdf"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Algebra");
    assert_eq!(body["creator_name"], "Teacher T");
    assert_eq!(body["files"][0], "/uploads/courses/week1.pdf");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_validates_references(pool: PgPool) {
    let teacher = create_test_user(&pool, "Teacher T", UserRole::Teacher).await;
    let student = create_test_user(&pool, "Student S", UserRole::Student).await;
    let classroom_id = create_classroom(&pool, "7A").await;

    // Unknown creator.
    let (status, _) = post(
        setup_test_app(pool.clone()),
        "/api/courses",
        json!({ "title": "X", "created_by": Uuid::new_v4(), "classroom_id": classroom_id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Students cannot create courses.
    let (status, _) = post(
        setup_test_app(pool.clone()),
        "/api/courses",
        json!({ "title": "X", "created_by": student, "classroom_id": classroom_id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown classroom.
    let (status, _) = post(
        setup_test_app(pool.clone()),
        "/api/courses",
        json!({ "title": "X", "created_by": teacher, "classroom_id": Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_courses_filters(pool: PgPool) {
    let teacher = create_test_user(&pool, "Teacher T", UserRole::Teacher).await;
    let admin = create_test_user(&pool, "Admin A", UserRole::Admin).await;
    let class_a = create_classroom(&pool, "7A").await;
    let class_b = create_classroom(&pool, "8B").await;

    for (title, creator, classroom) in [
        ("Algebra", teacher, class_a),
        ("Biology", teacher, class_b),
        ("Civics", admin, class_b),
    ] {
        let (status, _) = post(
            setup_test_app(pool.clone()),
            "/api/courses",
            json!({ "title": title, "created_by": creator, "classroom_id": classroom }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = get(setup_test_app(pool.clone()), "/api/courses").await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = get(
        setup_test_app(pool.clone()),
        &format!("/api/courses?classroom_id={class_b}"),
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get(
        setup_test_app(pool.clone()),
        &format!("/api/courses?classroom_id={class_b}&created_by={admin}"),
    )
    .await;
    let courses = body.as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["title"], "Civics");
    assert_eq!(courses[0]["creator_name"], "Admin A");
}
