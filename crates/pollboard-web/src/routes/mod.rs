pub mod admin;
pub mod polls;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/", get(polls::index))
        .route("/{question_id}", get(polls::detail))
        .route("/{question_id}/results", get(polls::results))
        .route("/{question_id}/vote", post(polls::vote))
        .route("/admin/questions", get(admin::question_list))
        .route(
            "/admin/questions/new",
            get(admin::new_question_form).post(admin::create_question),
        )
        .route(
            "/admin/questions/{question_id}",
            get(admin::edit_question_form).post(admin::update_question),
        )
        .route(
            "/admin/questions/{question_id}/delete",
            post(admin::delete_question),
        )
}

/// 302 redirect-after-post, so a refresh on the target page does not
/// resubmit the form.
pub(crate) fn redirect_found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
