use crate::{
    modules::messages::model::{
        InvitationResponse, InvitationStatus, Message, MessageType, MessageView, SendMessageDto,
    },
    modules::users::model::UserRole,
    modules::users::service::UserService,
    utils::errors::AppError,
};
use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = "id, sender, receiver, message_type, content, is_read, \
     invitation_child_id, invitation_status, invitation_relationship, created_at";

pub struct MessageService;

impl MessageService {
    #[instrument(skip(db, dto))]
    pub async fn send_message(db: &PgPool, dto: SendMessageDto) -> Result<Message, AppError> {
        if UserService::get_role(db, dto.receiver).await?.is_none() {
            return Err(AppError::not_found("Receiver not found".to_string()));
        }

        let invitation = match dto.message_type {
            MessageType::Normal => {
                let has_content = dto
                    .content
                    .as_deref()
                    .is_some_and(|content| !content.trim().is_empty());
                if !has_content {
                    return Err(AppError::validation(
                        "content is required for normal messages",
                    ));
                }
                None
            }
            MessageType::Invitation => {
                let invitation = dto.invitation.as_ref().ok_or_else(|| {
                    AppError::validation("invitation payload is required for invitation messages")
                })?;

                match UserService::get_role(db, invitation.child_id).await? {
                    Some(UserRole::Student) => {}
                    _ => return Err(AppError::validation("Invalid child specified")),
                }

                Some(invitation)
            }
            MessageType::Notification => None,
        };

        let message = sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages
                (sender, receiver, message_type, content,
                 invitation_child_id, invitation_status, invitation_relationship)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(dto.sender)
        .bind(dto.receiver)
        .bind(dto.message_type)
        .bind(&dto.content)
        .bind(invitation.map(|inv| inv.child_id))
        .bind(invitation.map(|_| InvitationStatus::Pending))
        .bind(invitation.map(|inv| inv.relationship))
        .fetch_one(db)
        .await
        .map_err(|e| {
            // The receiver and child were checked above, but either can be
            // deleted before the insert lands; the constraint name says
            // which reference actually broke.
            let constraint = match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    db_err.constraint().map(str::to_owned)
                }
                _ => None,
            };
            match constraint.as_deref() {
                Some("messages_sender_fkey") => {
                    AppError::validation("Sender does not exist")
                }
                Some("messages_receiver_fkey") => {
                    AppError::not_found("Receiver not found")
                }
                Some("messages_invitation_child_id_fkey") => {
                    AppError::validation("Invalid child specified")
                }
                _ => AppError::from(e),
            }
        })?;

        Ok(message)
    }

    /// All messages where the user is sender or receiver, newest first,
    /// denormalized with counterpart and child display fields.
    #[instrument(skip(db))]
    pub async fn get_messages_for_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<MessageView>, AppError> {
        let messages = sqlx::query_as::<_, MessageView>(
            r#"
            SELECT m.id,
                   m.sender AS sender_id, s.name AS sender_name,
                   s.email AS sender_email, s.role AS sender_role,
                   m.receiver AS receiver_id, r.name AS receiver_name,
                   r.email AS receiver_email, r.role AS receiver_role,
                   m.message_type, m.content, m.is_read,
                   m.invitation_child_id, ch.name AS invitation_child_name,
                   m.invitation_status, m.invitation_relationship, m.created_at
            FROM messages m
            JOIN users s ON s.id = m.sender
            JOIN users r ON r.id = m.receiver
            LEFT JOIN users ch ON ch.id = m.invitation_child_id
            WHERE m.sender = $1 OR m.receiver = $1
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(messages)
    }

    #[instrument(skip(db))]
    pub async fn get_unread_count(db: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE receiver = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(count)
    }

    /// Flips the read flag. Marking an already-read message is a no-op
    /// that returns the same state.
    #[instrument(skip(db))]
    pub async fn mark_as_read(db: &PgPool, message_id: Uuid) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages SET is_read = TRUE
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Message not found".to_string()))?;

        Ok(message)
    }

    /// Resolves a pending invitation. Acceptance flips the status and adds
    /// the child to the receiving parent's child set in one transaction;
    /// the row lock serializes concurrent respond attempts so the loser
    /// observes the already-resolved state. The child-set insert has set
    /// semantics; an already-linked child is a no-op.
    #[instrument(skip(db))]
    pub async fn respond_to_invitation(
        db: &PgPool,
        message_id: Uuid,
        response: InvitationResponse,
    ) -> Result<Message, AppError> {
        let mut tx = db.begin().await?;

        let message = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1 FOR UPDATE"
        ))
        .bind(message_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Message not found".to_string()))?;

        let new_status = message.invitation_transition(response)?;

        let updated = sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages SET invitation_status = $1
            WHERE id = $2
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(new_status)
        .bind(message_id)
        .fetch_one(&mut *tx)
        .await?;

        if new_status == InvitationStatus::Accepted {
            let child_id = message
                .invitation_child_id
                .ok_or_else(|| AppError::internal(anyhow!("invitation message has no child id")))?;

            sqlx::query(
                r#"
                INSERT INTO user_children (parent_id, child_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(message.receiver)
            .bind(child_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    #[instrument(skip(db))]
    pub async fn delete_message(db: &PgPool, message_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(message_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Message not found".to_string()));
        }

        Ok(())
    }
}
