use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("not found")]
    NotFound,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(include_str!("../templates/404.html")),
            )
                .into_response(),
            WebError::Internal(err) => {
                tracing::error!("web internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(include_str!("../templates/500.html")),
                )
                    .into_response()
            }
        }
    }
}

impl From<pollboard_db::DbError> for WebError {
    fn from(e: pollboard_db::DbError) -> Self {
        match e {
            pollboard_db::DbError::NotFound => WebError::NotFound,
            pollboard_db::DbError::Sqlx(e) => WebError::Internal(anyhow::anyhow!(e)),
        }
    }
}

impl From<tera::Error> for WebError {
    fn from(e: tera::Error) -> Self {
        WebError::Internal(anyhow::anyhow!(e))
    }
}
