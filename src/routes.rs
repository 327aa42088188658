use crate::{
    data::StudentStore,
    routes::students::{delete_student, get_students, post_student, put_student},
    state::StudentsState,
};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod students;

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}

pub fn router<S: StudentStore>(state: StudentsState<S>) -> Router {
    Router::new()
        .route(
            "/students",
            get(get_students::<S>)
                .post(post_student::<S>)
                .put(put_student::<S>)
                .delete(delete_student::<S>),
        )
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
