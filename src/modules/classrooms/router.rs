use crate::modules::classrooms::controller::{
    create_classroom, delete_classroom, get_classroom, get_classrooms, get_teacher_classrooms,
    update_classroom,
};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_classrooms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_classrooms).post(create_classroom))
        .route(
            "/{id}",
            get(get_classroom)
                .put(update_classroom)
                .delete(delete_classroom),
        )
        .route("/my-classes/{teacher_id}", get(get_teacher_classrooms))
}
