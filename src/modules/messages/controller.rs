use crate::modules::messages::model::{
    Message, MessageView, RespondInvitationDto, SendMessageDto, UnreadCountResponse,
};
use crate::modules::messages::service::MessageService;
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

/// Send a message to another user
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageDto,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Missing content or invalid invitation child", body = ErrorResponse),
        (status = 404, description = "Receiver not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Messages"
)]
#[instrument(skip(state, dto))]
pub async fn send_message(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SendMessageDto>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = MessageService::send_message(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// List a user's messages, newest first
#[utoipa::path(
    get,
    path = "/api/messages/user/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Messages sent or received by the user", body = Vec<MessageView>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Messages"
)]
#[instrument(skip(state))]
pub async fn get_messages(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<MessageView>>, AppError> {
    let messages = MessageService::get_messages_for_user(&state.db, user_id).await?;
    Ok(Json(messages))
}

/// Count of unread messages addressed to a user
#[utoipa::path(
    get,
    path = "/api/messages/unread/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Unread message count", body = UnreadCountResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Messages"
)]
#[instrument(skip(state))]
pub async fn get_unread_count(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = MessageService::get_unread_count(&state.db, user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark a message as read (idempotent)
#[utoipa::path(
    put,
    path = "/api/messages/read/{message_id}",
    params(("message_id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message marked read", body = Message),
        (status = 404, description = "Message not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Messages"
)]
#[instrument(skip(state))]
pub async fn mark_as_read(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    let message = MessageService::mark_as_read(&state.db, message_id).await?;
    Ok(Json(message))
}

/// Accept or reject a pending invitation
#[utoipa::path(
    put,
    path = "/api/messages/invitation/{message_id}",
    params(("message_id" = Uuid, Path, description = "Message ID")),
    request_body = RespondInvitationDto,
    responses(
        (status = 200, description = "Invitation resolved", body = Message),
        (status = 400, description = "Status must be accepted or rejected", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
        (status = 409, description = "Not an invitation, or already resolved", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Messages"
)]
#[instrument(skip(state, dto))]
pub async fn respond_to_invitation(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<RespondInvitationDto>,
) -> Result<Json<Message>, AppError> {
    let message =
        MessageService::respond_to_invitation(&state.db, message_id, dto.status).await?;
    Ok(Json(message))
}

/// Delete a message
#[utoipa::path(
    delete,
    path = "/api/messages/{message_id}",
    params(("message_id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message deleted successfully"),
        (status = 404, description = "Message not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Messages"
)]
#[instrument(skip(state))]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    MessageService::delete_message(&state.db, message_id).await?;
    Ok(Json(json!({ "message": "Message deleted successfully" })))
}
