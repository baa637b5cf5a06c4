//! Message models and the invitation state machine.
//!
//! A message of type `invitation` proposes linking a child to the
//! receiving parent. Its status moves one way out of `pending` and is
//! terminal once resolved; the transition rules live on [`Message`] so
//! they can be checked independently of any store.

use crate::modules::users::model::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::errors::AppError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "message_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Normal,
    Invitation,
    Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Relationship the sender claims to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "relationship", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Father,
    Mother,
    Guardian,
    Other,
}

/// The only two acceptable responses to a pending invitation. `pending`
/// is not a valid response and fails deserialization at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvitationResponse {
    Accepted,
    Rejected,
}

impl From<InvitationResponse> for InvitationStatus {
    fn from(response: InvitationResponse) -> Self {
        match response {
            InvitationResponse::Accepted => Self::Accepted,
            InvitationResponse::Rejected => Self::Rejected,
        }
    }
}

/// A message as stored. Invitation fields are populated iff the type is
/// `invitation` (enforced by a table constraint).
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub sender: Uuid,
    pub receiver: Uuid,
    pub message_type: MessageType,
    pub content: Option<String>,
    pub is_read: bool,
    pub invitation_child_id: Option<Uuid>,
    pub invitation_status: Option<InvitationStatus>,
    pub invitation_relationship: Option<Relationship>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Validates a respond attempt against the state machine: the message
    /// must be an invitation and its status must still be `pending`.
    /// Returns the status the invitation moves to.
    pub fn invitation_transition(
        &self,
        response: InvitationResponse,
    ) -> Result<InvitationStatus, AppError> {
        if self.message_type != MessageType::Invitation {
            return Err(AppError::invalid_state(
                "Message is not an invitation".to_string(),
            ));
        }

        match self.invitation_status {
            Some(InvitationStatus::Pending) => Ok(response.into()),
            Some(_) => Err(AppError::invalid_state(
                "Invitation has already been resolved".to_string(),
            )),
            None => Err(AppError::invalid_state(
                "Message carries no invitation state".to_string(),
            )),
        }
    }
}

/// A message denormalized for display: counterpart names/roles and, for
/// invitations, the child's name.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct MessageView {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_role: UserRole,
    pub receiver_id: Uuid,
    pub receiver_name: String,
    pub receiver_email: String,
    pub receiver_role: UserRole,
    pub message_type: MessageType,
    pub content: Option<String>,
    pub is_read: bool,
    pub invitation_child_id: Option<Uuid>,
    pub invitation_child_name: Option<String>,
    pub invitation_status: Option<InvitationStatus>,
    pub invitation_relationship: Option<Relationship>,
    pub created_at: DateTime<Utc>,
}

/// Invitation payload attached to an invitation message.
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct InvitationDto {
    pub child_id: Uuid,
    pub relationship: Relationship,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct SendMessageDto {
    pub sender: Uuid,
    pub receiver: Uuid,
    #[serde(default)]
    pub message_type: MessageType,
    pub content: Option<String>,
    pub invitation: Option<InvitationDto>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct RespondInvitationDto {
    pub status: InvitationResponse,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation_message(status: Option<InvitationStatus>) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender: Uuid::new_v4(),
            receiver: Uuid::new_v4(),
            message_type: MessageType::Invitation,
            content: None,
            is_read: false,
            invitation_child_id: Some(Uuid::new_v4()),
            invitation_status: status,
            invitation_relationship: Some(Relationship::Mother),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_invitation_accepts() {
        let message = invitation_message(Some(InvitationStatus::Pending));
        let next = message
            .invitation_transition(InvitationResponse::Accepted)
            .unwrap();
        assert_eq!(next, InvitationStatus::Accepted);
    }

    #[test]
    fn test_pending_invitation_rejects() {
        let message = invitation_message(Some(InvitationStatus::Pending));
        let next = message
            .invitation_transition(InvitationResponse::Rejected)
            .unwrap();
        assert_eq!(next, InvitationStatus::Rejected);
    }

    #[test]
    fn test_resolved_invitation_is_terminal() {
        for status in [InvitationStatus::Accepted, InvitationStatus::Rejected] {
            let message = invitation_message(Some(status));
            let err = message
                .invitation_transition(InvitationResponse::Accepted)
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidState(_)));
        }
    }

    #[test]
    fn test_normal_message_cannot_transition() {
        let mut message = invitation_message(None);
        message.message_type = MessageType::Normal;
        let err = message
            .invitation_transition(InvitationResponse::Accepted)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_invitation_response_rejects_pending() {
        assert!(serde_json::from_str::<InvitationResponse>("\"pending\"").is_err());
        let accepted: InvitationResponse = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(accepted, InvitationResponse::Accepted);
    }

    #[test]
    fn test_message_type_defaults_to_normal() {
        let dto: SendMessageDto = serde_json::from_str(&format!(
            r#"{{"sender":"{}","receiver":"{}","content":"hi"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(dto.message_type, MessageType::Normal);
        assert!(dto.invitation.is_none());
    }
}
