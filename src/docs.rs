use utoipa::OpenApi;

use crate::modules::classrooms::model::{
    ClassroomResponse, ClassroomWithCourses, CreateClassroomDto, TimeSlot, UpdateClassroomDto,
    Weekday,
};
use crate::modules::courses::model::{CourseView, CreateCourseDto};
use crate::modules::messages::model::{
    InvitationDto, InvitationResponse, InvitationStatus, Message, MessageType, MessageView,
    Relationship, RespondInvitationDto, SendMessageDto, UnreadCountResponse,
};
use crate::modules::users::controller::ErrorResponse;
use crate::modules::users::model::{
    AppendAttendanceDto, AttendanceRecord, AttendanceStatus, AttendanceSummary, CreateUserDto,
    UpdateUserDto, User, UserDetail, UserRole, UserSummary,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::append_attendance,
        crate::modules::classrooms::controller::create_classroom,
        crate::modules::classrooms::controller::get_classrooms,
        crate::modules::classrooms::controller::get_classroom,
        crate::modules::classrooms::controller::update_classroom,
        crate::modules::classrooms::controller::delete_classroom,
        crate::modules::classrooms::controller::get_teacher_classrooms,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::messages::controller::send_message,
        crate::modules::messages::controller::get_messages,
        crate::modules::messages::controller::get_unread_count,
        crate::modules::messages::controller::mark_as_read,
        crate::modules::messages::controller::respond_to_invitation,
        crate::modules::messages::controller::delete_message,
    ),
    components(
        schemas(
            ErrorResponse,
            User,
            UserRole,
            UserSummary,
            UserDetail,
            CreateUserDto,
            UpdateUserDto,
            AttendanceRecord,
            AttendanceStatus,
            AttendanceSummary,
            AppendAttendanceDto,
            ClassroomResponse,
            ClassroomWithCourses,
            CreateClassroomDto,
            UpdateClassroomDto,
            TimeSlot,
            Weekday,
            CourseView,
            CreateCourseDto,
            Message,
            MessageView,
            MessageType,
            SendMessageDto,
            InvitationDto,
            InvitationStatus,
            InvitationResponse,
            Relationship,
            RespondInvitationDto,
            UnreadCountResponse,
        )
    ),
    tags(
        (name = "Users", description = "User directory and attendance ledger"),
        (name = "Classrooms", description = "Classroom rosters and schedules"),
        (name = "Courses", description = "Course catalog"),
        (name = "Messages", description = "Messaging and parent-child invitations")
    ),
    info(
        title = "Slateboard API",
        description = "Role-scoped academic records service: users, classroom rosters, courses, attendance and messaging.",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
