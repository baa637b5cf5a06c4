use crate::{
    modules::users::model::{
        AppendAttendanceDto, AttendanceRecord, AttendanceSummary, CreateUserDto, UpdateUserDto,
        User, UserDetail, UserRole,
    },
    utils::{errors::AppError, password::hash_password},
};
use anyhow::Context;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::instrument;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

pub struct UserService;

impl UserService {
    #[instrument(skip(db, dto))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(format!(
                        "User with email {} already exists",
                        dto.email
                    ));
                }
            }
            AppError::from(e)
        })?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn get_users(db: &PgPool, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::user_role IS NULL OR role = $1
            ORDER BY name
            "#
        ))
        .bind(role)
        .fetch_all(db)
        .await?;

        Ok(users)
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User with id {} not found", id)))?;

        Ok(user)
    }

    /// Full view: user plus child links and the attendance ledger with its
    /// derived aggregates. Aggregates are computed here on read; they are
    /// not stored anywhere.
    #[instrument(skip(db))]
    pub async fn get_user_detail(db: &PgPool, id: Uuid) -> Result<UserDetail, AppError> {
        let user = Self::get_user(db, id).await?;

        let children = sqlx::query_scalar::<_, Uuid>(
            "SELECT child_id FROM user_children WHERE parent_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        let attendance = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, date, status, note, created_at
            FROM attendance_records
            WHERE user_id = $1
            ORDER BY date, created_at
            "#,
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        let attendance_summary = AttendanceSummary::from_records(&attendance);

        Ok(UserDetail {
            user,
            children,
            attendance,
            attendance_summary,
        })
    }

    /// Applies a partial update in a single statement. Omitted fields keep
    /// their stored values, so an absent password never clobbers the hash,
    /// and a role change lands atomically with the other fields.
    #[instrument(skip(db, dto))]
    pub async fn update_user(db: &PgPool, id: Uuid, dto: UpdateUserDto) -> Result<User, AppError> {
        let hashed_password = dto.password.as_deref().map(hash_password).transpose()?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($1, name),
                email = COALESCE($2, email),
                password = COALESCE($3, password),
                role = COALESCE($4, role),
                updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict("Another user already uses this email".to_string());
                }
            }
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::not_found(format!("User with id {} not found", id)))?;

        Ok(user)
    }

    /// Deletes the user. Roster membership rows, child links, attendance
    /// and messages referencing the user go with it; the junction-table
    /// cascades are what keep classroom rosters free of dangling members.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete user")
            .map_err(AppError::internal)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Appends one record to the user's attendance ledger. There is no
    /// corresponding edit or delete; the ledger is the audit trail.
    #[instrument(skip(db, dto))]
    pub async fn append_attendance(
        db: &PgPool,
        user_id: Uuid,
        dto: AppendAttendanceDto,
    ) -> Result<UserDetail, AppError> {
        // The user FK is the only reference on this insert, so a violation
        // can mean nothing but a missing (or concurrently deleted) user.
        sqlx::query(
            r#"
            INSERT INTO attendance_records (user_id, date, status, note)
            VALUES ($1, COALESCE($2, CURRENT_DATE), $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(dto.date)
        .bind(dto.status)
        .bind(&dto.note)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(format!(
                        "User with id {} not found",
                        user_id
                    ));
                }
            }
            AppError::from(e)
        })?;

        Self::get_user_detail(db, user_id).await
    }

    /// Verifies that every id resolves to an existing user with the given
    /// role. Fails with a `Validation` error naming the offending ids.
    #[instrument(skip(db, ids))]
    pub async fn ensure_role(
        db: &PgPool,
        ids: &[Uuid],
        role: UserRole,
    ) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }

        let found: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM users WHERE id = ANY($1) AND role = $2",
        )
        .bind(ids)
        .bind(role)
        .fetch_all(db)
        .await?;

        let found: HashSet<Uuid> = found.into_iter().collect();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found.contains(id))
            .map(|id| id.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "Ids do not resolve to existing users with role {}: {}",
                role,
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// Role of a user, or `None` if the id does not exist.
    #[instrument(skip(db))]
    pub async fn get_role(db: &PgPool, id: Uuid) -> Result<Option<UserRole>, AppError> {
        let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(role)
    }
}
