use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use chess_stats_core::Error as CoreError;

#[derive(Error, Debug)]
pub enum WebError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Core(CoreError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            WebError::Core(CoreError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            WebError::Core(_) => StatusCode::BAD_GATEWAY,
            WebError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let template = ErrorTemplate {
            title: status.to_string(),
            message: self.to_string(),
        };
        match template.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (status, template.message).into_response()
            }
        }
    }
}
