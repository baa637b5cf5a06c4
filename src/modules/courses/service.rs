use crate::{
    modules::courses::model::{CourseFilterParams, CourseView, CreateCourseDto},
    modules::users::model::UserRole,
    modules::users::service::UserService,
    utils::errors::AppError,
};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

const COURSE_VIEW_QUERY: &str = r#"
    SELECT c.id, c.title, c.description, c.created_by,
           u.name AS creator_name, u.email AS creator_email,
           c.classroom_id, c.files, c.created_at
    FROM courses c
    LEFT JOIN users u ON u.id = c.created_by
"#;

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, dto))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<CourseView, AppError> {
        match UserService::get_role(db, dto.created_by).await? {
            Some(UserRole::Teacher) | Some(UserRole::Admin) => {}
            Some(_) => {
                return Err(AppError::validation(
                    "Course creator must be a teacher or an admin",
                ));
            }
            None => {
                return Err(AppError::validation(format!(
                    "Creator with id {} does not exist",
                    dto.created_by
                )));
            }
        }

        let classroom_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM classrooms WHERE id = $1)")
                .bind(dto.classroom_id)
                .fetch_one(db)
                .await?;
        if !classroom_exists {
            return Err(AppError::validation(format!(
                "Classroom with id {} does not exist",
                dto.classroom_id
            )));
        }

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO courses (title, description, created_by, classroom_id, files)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.created_by)
        .bind(dto.classroom_id)
        .bind(&dto.files)
        .fetch_one(db)
        .await?;

        let course = sqlx::query_as::<_, CourseView>(&format!(
            "{COURSE_VIEW_QUERY} WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(course)
    }

    #[instrument(skip(db))]
    pub async fn get_courses(
        db: &PgPool,
        filter: CourseFilterParams,
    ) -> Result<Vec<CourseView>, AppError> {
        let courses = sqlx::query_as::<_, CourseView>(&format!(
            r#"
            {COURSE_VIEW_QUERY}
            WHERE ($1::uuid IS NULL OR c.classroom_id = $1)
              AND ($2::uuid IS NULL OR c.created_by = $2)
            ORDER BY c.created_at DESC
            "#
        ))
        .bind(filter.classroom_id)
        .bind(filter.created_by)
        .fetch_all(db)
        .await?;

        Ok(courses)
    }

    /// Courses for a batch of classrooms, grouped by classroom id. Used by
    /// the roster manager's teacher view.
    #[instrument(skip(db, classroom_ids))]
    pub async fn get_courses_grouped(
        db: &PgPool,
        classroom_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<CourseView>>, AppError> {
        if classroom_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let courses = sqlx::query_as::<_, CourseView>(&format!(
            r#"
            {COURSE_VIEW_QUERY}
            WHERE c.classroom_id = ANY($1)
            ORDER BY c.created_at DESC
            "#
        ))
        .bind(classroom_ids)
        .fetch_all(db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<CourseView>> = HashMap::new();
        for course in courses {
            grouped.entry(course.classroom_id).or_default().push(course);
        }
        Ok(grouped)
    }
}
