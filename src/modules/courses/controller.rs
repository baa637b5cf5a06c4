use crate::modules::courses::model::{CourseFilterParams, CourseView, CreateCourseDto};
use crate::modules::courses::service::CourseService;
use crate::modules::users::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

/// Create a course bound to a classroom and a creator
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created successfully", body = CourseView),
        (status = 400, description = "Creator or classroom does not exist", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<CourseView>), AppError> {
    let course = CourseService::create_course(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// List courses, optionally filtered by classroom or creator
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseFilterParams),
    responses(
        (status = 200, description = "List of courses", body = Vec<CourseView>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilterParams>,
) -> Result<Json<Vec<CourseView>>, AppError> {
    let courses = CourseService::get_courses(&state.db, filter).await?;
    Ok(Json(courses))
}
