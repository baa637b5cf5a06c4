//! Classroom models: the roster, the weekly schedule, and the delta
//! computation that keeps roster updates from clobbering memberships.

use crate::modules::courses::model::CourseView;
use crate::modules::users::model::UserSummary;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// One entry in a classroom's weekly schedule. Times are wall-clock
/// strings ("08:30"); the schedule is owned by its classroom outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
}

/// Classroom row as stored. Roster membership lives in the junction
/// tables, not here; `version` is bumped by every update and guards
/// against concurrent roster writes.
#[derive(FromRow, Debug, Clone)]
pub struct Classroom {
    pub id: Uuid,
    pub name: String,
    pub schedule: Json<Vec<TimeSlot>>,
    pub version: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Classroom with populated member summaries.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ClassroomResponse {
    pub id: Uuid,
    pub name: String,
    pub schedule: Vec<TimeSlot>,
    pub version: i64,
    pub students: Vec<UserSummary>,
    pub teachers: Vec<UserSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ClassroomResponse {
    pub fn from_parts(
        classroom: Classroom,
        students: Vec<UserSummary>,
        teachers: Vec<UserSummary>,
    ) -> Self {
        Self {
            id: classroom.id,
            name: classroom.name,
            schedule: classroom.schedule.0,
            version: classroom.version,
            students,
            teachers,
            created_at: classroom.created_at,
            updated_at: classroom.updated_at,
        }
    }
}

/// A teacher's classroom annotated with its courses.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ClassroomWithCourses {
    #[serde(flatten)]
    pub classroom: ClassroomResponse,
    pub courses: Vec<CourseView>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateClassroomDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub student_ids: Vec<Uuid>,
    #[serde(default)]
    pub teacher_ids: Vec<Uuid>,
    #[serde(default)]
    pub schedule: Vec<TimeSlot>,
}

/// Full-replacement update, same shape as create. The service diffs the
/// submitted roster against the stored one rather than overwriting rows.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateClassroomDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub student_ids: Vec<Uuid>,
    #[serde(default)]
    pub teacher_ids: Vec<Uuid>,
    #[serde(default)]
    pub schedule: Vec<TimeSlot>,
}

/// Added and removed members between the stored roster and a submitted
/// one. Duplicate ids in the submission count once.
pub fn roster_delta(old: &[Uuid], new: &[Uuid]) -> (Vec<Uuid>, Vec<Uuid>) {
    let old_set: HashSet<Uuid> = old.iter().copied().collect();
    let new_set: HashSet<Uuid> = new.iter().copied().collect();

    let added = new_set.difference(&old_set).copied().collect();
    let removed = old_set.difference(&new_set).copied().collect();
    (added, removed)
}
