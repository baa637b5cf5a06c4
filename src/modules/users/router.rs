use crate::modules::users::controller::{
    append_attendance, create_user, delete_user, get_user, get_users, update_user,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/attendance", post(append_attendance))
}
