use crate::modules::classrooms::model::{
    ClassroomResponse, ClassroomWithCourses, CreateClassroomDto, UpdateClassroomDto,
};
use crate::modules::classrooms::service::ClassroomService;
use crate::modules::users::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

/// Create a classroom with its roster and schedule
#[utoipa::path(
    post,
    path = "/api/classrooms",
    request_body = CreateClassroomDto,
    responses(
        (status = 201, description = "Classroom created successfully", body = ClassroomResponse),
        (status = 400, description = "A member id does not resolve to a user of the required role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state, dto))]
pub async fn create_classroom(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassroomDto>,
) -> Result<(StatusCode, Json<ClassroomResponse>), AppError> {
    let classroom = ClassroomService::create_classroom(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

/// List all classrooms with populated rosters
#[utoipa::path(
    get,
    path = "/api/classrooms",
    responses(
        (status = 200, description = "List of classrooms", body = Vec<ClassroomResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn get_classrooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassroomResponse>>, AppError> {
    let classrooms = ClassroomService::get_classrooms(&state.db).await?;
    Ok(Json(classrooms))
}

/// Get a classroom by id
#[utoipa::path(
    get,
    path = "/api/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom details", body = ClassroomResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn get_classroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassroomResponse>, AppError> {
    let classroom = ClassroomService::get_classroom(&state.db, id).await?;
    Ok(Json(classroom))
}

/// Update a classroom, applying roster changes as a delta
#[utoipa::path(
    put,
    path = "/api/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom ID")),
    request_body = UpdateClassroomDto,
    responses(
        (status = 200, description = "Classroom updated successfully", body = ClassroomResponse),
        (status = 400, description = "A member id does not resolve to a user of the required role", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse),
        (status = 409, description = "Concurrent update conflict; retry", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state, dto))]
pub async fn update_classroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateClassroomDto>,
) -> Result<Json<ClassroomResponse>, AppError> {
    let classroom = ClassroomService::update_classroom(&state.db, id, dto).await?;
    Ok(Json(classroom))
}

/// Delete a classroom and every member's back-reference to it
#[utoipa::path(
    delete,
    path = "/api/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom deleted successfully"),
        (status = 404, description = "Classroom not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn delete_classroom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    ClassroomService::delete_classroom(&state.db, id).await?;
    Ok(Json(json!({ "message": "Classroom deleted" })))
}

/// List a teacher's classrooms, each annotated with its courses
#[utoipa::path(
    get,
    path = "/api/classrooms/my-classes/{teacher_id}",
    params(("teacher_id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher's classrooms with courses", body = Vec<ClassroomWithCourses>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn get_teacher_classrooms(
    State(state): State<AppState>,
    Path(teacher_id): Path<Uuid>,
) -> Result<Json<Vec<ClassroomWithCourses>>, AppError> {
    let classrooms = ClassroomService::get_teacher_classrooms(&state.db, teacher_id).await?;
    Ok(Json(classrooms))
}
