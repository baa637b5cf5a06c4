use crate::modules::messages::controller::{
    delete_message, get_messages, get_unread_count, mark_as_read, respond_to_invitation,
    send_message,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn init_messages_router() -> Router<AppState> {
    Router::new()
        .route("/", post(send_message))
        .route("/user/{user_id}", get(get_messages))
        .route("/unread/{user_id}", get(get_unread_count))
        .route("/read/{message_id}", put(mark_as_read))
        .route("/invitation/{message_id}", put(respond_to_invitation))
        .route("/{message_id}", delete(delete_message))
}
