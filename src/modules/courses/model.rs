//! Course catalog models. Files are opaque locators produced by the
//! external upload collaborator before a course is created.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Course joined with its creator's display fields. `created_by` becomes
/// null if the creator account is later deleted.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct CourseView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
    pub classroom_id: Uuid,
    pub files: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub classroom_id: Uuid,
    /// Stable locators returned by the file-storage collaborator.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Optional list filters; combinable.
#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
pub struct CourseFilterParams {
    pub classroom_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}
