use crate::{
    modules::classrooms::model::{
        Classroom, ClassroomResponse, ClassroomWithCourses, CreateClassroomDto,
        UpdateClassroomDto, roster_delta,
    },
    modules::courses::service::CourseService,
    modules::users::model::{UserRole, UserSummary},
    modules::users::service::UserService,
    utils::errors::AppError,
};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

const CLASSROOM_COLUMNS: &str = "id, name, schedule, version, created_at, updated_at";

/// A roster member row joined with its user summary.
#[derive(FromRow)]
struct MemberRow {
    classroom_id: Uuid,
    id: Uuid,
    name: String,
    email: String,
    role: UserRole,
}

impl MemberRow {
    fn into_summary(self) -> (Uuid, UserSummary) {
        (
            self.classroom_id,
            UserSummary {
                id: self.id,
                name: self.name,
                email: self.email,
                role: self.role,
            },
        )
    }
}

pub struct ClassroomService;

impl ClassroomService {
    /// Creates the classroom and its roster rows as one transaction, so a
    /// classroom can never exist with only half its membership recorded.
    #[instrument(skip(db, dto))]
    pub async fn create_classroom(
        db: &PgPool,
        dto: CreateClassroomDto,
    ) -> Result<ClassroomResponse, AppError> {
        UserService::ensure_role(db, &dto.student_ids, UserRole::Student).await?;
        UserService::ensure_role(db, &dto.teacher_ids, UserRole::Teacher).await?;

        let mut tx = db.begin().await?;

        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            r#"
            INSERT INTO classrooms (name, schedule)
            VALUES ($1, $2)
            RETURNING {CLASSROOM_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(Json(&dto.schedule))
        .fetch_one(&mut *tx)
        .await?;

        Self::add_members(&mut tx, "classroom_students", classroom.id, &dto.student_ids).await?;
        Self::add_members(&mut tx, "classroom_teachers", classroom.id, &dto.teacher_ids).await?;

        tx.commit().await?;

        Self::get_classroom(db, classroom.id).await
    }

    #[instrument(skip(db))]
    pub async fn get_classrooms(db: &PgPool) -> Result<Vec<ClassroomResponse>, AppError> {
        let classrooms = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms ORDER BY name"
        ))
        .fetch_all(db)
        .await?;

        Self::populate(db, classrooms).await
    }

    #[instrument(skip(db))]
    pub async fn get_classroom(db: &PgPool, id: Uuid) -> Result<ClassroomResponse, AppError> {
        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Classroom with id {} not found", id)))?;

        let mut populated = Self::populate(db, vec![classroom]).await?;
        Ok(populated.remove(0))
    }

    /// Delta-based roster update. The submitted roster is diffed against a
    /// freshly read prior state and only the added/removed member rows are
    /// touched. The version guard turns a lost race with a concurrent
    /// update into a retryable `Conflict` instead of silently overwriting
    /// the other writer's delta.
    #[instrument(skip(db, dto))]
    pub async fn update_classroom(
        db: &PgPool,
        id: Uuid,
        dto: UpdateClassroomDto,
    ) -> Result<ClassroomResponse, AppError> {
        UserService::ensure_role(db, &dto.student_ids, UserRole::Student).await?;
        UserService::ensure_role(db, &dto.teacher_ids, UserRole::Teacher).await?;

        let mut tx = db.begin().await?;

        let existing = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Classroom with id {} not found", id)))?;

        let old_students: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM classroom_students WHERE classroom_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let old_teachers: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM classroom_teachers WHERE classroom_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE classrooms
            SET name = $1, schedule = $2, version = version + 1, updated_at = NOW()
            WHERE id = $3 AND version = $4
            "#,
        )
        .bind(&dto.name)
        .bind(Json(&dto.schedule))
        .bind(id)
        .bind(existing.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(
                "Classroom was modified concurrently; retry the update",
            ));
        }

        let (added_students, removed_students) = roster_delta(&old_students, &dto.student_ids);
        let (added_teachers, removed_teachers) = roster_delta(&old_teachers, &dto.teacher_ids);

        Self::add_members(&mut tx, "classroom_students", id, &added_students).await?;
        Self::remove_members(&mut tx, "classroom_students", id, &removed_students).await?;
        Self::add_members(&mut tx, "classroom_teachers", id, &added_teachers).await?;
        Self::remove_members(&mut tx, "classroom_teachers", id, &removed_teachers).await?;

        tx.commit().await?;

        Self::get_classroom(db, id).await
    }

    /// Deletes the classroom. The roster rows are the users' back
    /// references, and they go with the classroom in the same statement.
    #[instrument(skip(db))]
    pub async fn delete_classroom(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM classrooms WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Classroom with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Classrooms where the user is on the teacher roster, each annotated
    /// with its courses.
    #[instrument(skip(db))]
    pub async fn get_teacher_classrooms(
        db: &PgPool,
        teacher_id: Uuid,
    ) -> Result<Vec<ClassroomWithCourses>, AppError> {
        let classrooms = sqlx::query_as::<_, Classroom>(&format!(
            r#"
            SELECT c.id, c.name, c.schedule, c.version, c.created_at, c.updated_at
            FROM classrooms c
            JOIN classroom_teachers ct ON ct.classroom_id = c.id
            WHERE ct.user_id = $1
            ORDER BY c.name
            "#
        ))
        .bind(teacher_id)
        .fetch_all(db)
        .await?;

        let ids: Vec<Uuid> = classrooms.iter().map(|c| c.id).collect();
        let mut courses_by_classroom = CourseService::get_courses_grouped(db, &ids).await?;

        let populated = Self::populate(db, classrooms).await?;

        Ok(populated
            .into_iter()
            .map(|classroom| {
                let courses = courses_by_classroom
                    .remove(&classroom.id)
                    .unwrap_or_default();
                ClassroomWithCourses { classroom, courses }
            })
            .collect())
    }

    /// Attaches student and teacher summaries to a batch of classrooms.
    async fn populate(
        db: &PgPool,
        classrooms: Vec<Classroom>,
    ) -> Result<Vec<ClassroomResponse>, AppError> {
        let ids: Vec<Uuid> = classrooms.iter().map(|c| c.id).collect();

        let mut students = Self::load_members(db, "classroom_students", &ids).await?;
        let mut teachers = Self::load_members(db, "classroom_teachers", &ids).await?;

        Ok(classrooms
            .into_iter()
            .map(|classroom| {
                let s = students.remove(&classroom.id).unwrap_or_default();
                let t = teachers.remove(&classroom.id).unwrap_or_default();
                ClassroomResponse::from_parts(classroom, s, t)
            })
            .collect())
    }

    async fn load_members(
        db: &PgPool,
        table: &str,
        classroom_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<UserSummary>>, AppError> {
        if classroom_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            SELECT m.classroom_id, u.id, u.name, u.email, u.role
            FROM {table} m
            JOIN users u ON u.id = m.user_id
            WHERE m.classroom_id = ANY($1)
            ORDER BY u.name
            "#
        ))
        .bind(classroom_ids)
        .fetch_all(db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
        for row in rows {
            let (classroom_id, summary) = row.into_summary();
            grouped.entry(classroom_id).or_default().push(summary);
        }
        Ok(grouped)
    }

    async fn add_members(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        table: &str,
        classroom_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), AppError> {
        if user_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(&format!(
            r#"
            INSERT INTO {table} (classroom_id, user_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#
        ))
        .bind(classroom_id)
        .bind(user_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn remove_members(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        table: &str,
        classroom_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), AppError> {
        if user_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(&format!(
            "DELETE FROM {table} WHERE classroom_id = $1 AND user_id = ANY($2)"
        ))
        .bind(classroom_id)
        .bind(user_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
