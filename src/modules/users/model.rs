//! User data models and DTOs.
//!
//! The [`User`] entity is the hub of the data graph: classroom rosters,
//! parent-child links, messages and the attendance ledger all reference it.
//! The password column is never selected into any of these types, so a
//! credential hash cannot leak through a response.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Role assigned to a user. Closed set; unknown values are rejected at
/// the request boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Teacher,
    #[default]
    Student,
    Parent,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Parent => "parent",
        };
        f.write_str(s)
    }
}

/// Present/absent marker on a single attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// A user as stored, minus the credential hash.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Compact user projection used when denormalizing references
/// (classroom rosters, message counterparts).
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// One entry in a user's attendance ledger. Rows are append-only; there
/// is no operation that edits or removes one.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Aggregates derived from the ledger on read; never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub total: usize,
}

impl AttendanceSummary {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let present = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count();
        Self {
            present,
            absent: records.len() - present,
            total: records.len(),
        }
    }
}

/// Full user view: the entity plus its child links and attendance ledger.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    /// Ids of linked children. Populated only for parents; empty otherwise.
    pub children: Vec<Uuid>,
    /// Attendance ledger ordered by date.
    pub attendance: Vec<AttendanceRecord>,
    pub attendance_summary: AttendanceSummary,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Partial update. An omitted password keeps the stored hash; a supplied
/// one is rehashed. A role change is applied in the same statement as the
/// other fields.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct AppendAttendanceDto {
    pub status: AttendanceStatus,
    pub note: Option<String>,
    /// Defaults to the current date when omitted.
    pub date: Option<NaiveDate>,
}

/// Query parameters for listing users.
#[derive(Deserialize, Debug, Clone, utoipa::IntoParams)]
pub struct UserFilterParams {
    pub role: Option<UserRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Parent).unwrap(), "\"parent\"");
        let role: UserRole = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(role, UserRole::Teacher);
    }

    #[test]
    fn test_role_rejects_unknown_value() {
        assert!(serde_json::from_str::<UserRole>("\"principal\"").is_err());
    }

    #[test]
    fn test_create_user_dto_defaults_to_student() {
        let json = r#"{"name":"Ada","email":"ada@school.test","password":"hunter22"}"#;
        let dto: CreateUserDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.role, UserRole::Student);
    }

    #[test]
    fn test_create_user_dto_validation() {
        let dto = CreateUserDto {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "hunter22".to_string(),
            role: UserRole::Student,
        };
        assert!(dto.validate().is_err());

        let dto = CreateUserDto {
            name: "Ada".to_string(),
            email: "ada@school.test".to_string(),
            password: "short".to_string(),
            role: UserRole::Student,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_user_dto_all_fields_optional() {
        let dto: UpdateUserDto = serde_json::from_str("{}").unwrap();
        assert!(dto.name.is_none());
        assert!(dto.password.is_none());
        assert!(dto.role.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_attendance_summary_counts() {
        let record = |status| AttendanceRecord {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            status,
            note: None,
            created_at: chrono::Utc::now(),
        };
        let records = vec![
            record(AttendanceStatus::Present),
            record(AttendanceStatus::Absent),
            record(AttendanceStatus::Present),
        ];

        let summary = AttendanceSummary::from_records(&records);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn test_user_serialization_has_no_password_field() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@school.test".to_string(),
            role: UserRole::Teacher,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let serialized = serde_json::to_string(&user).unwrap();
        assert!(!serialized.contains("password"));
        assert!(serialized.contains("ada@school.test"));
    }
}
