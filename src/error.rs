use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;

use crate::cloud::{InvalidFieldValue, WebhookPayloadError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidField(#[from] InvalidFieldValue),
    #[error(transparent)]
    Webhook(#[from] WebhookPayloadError),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    Message(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidField(err) => err.status(),
            AppError::Webhook(WebhookPayloadError::UnknownEvent(_)) => StatusCode::NOT_IMPLEMENTED,
            AppError::Webhook(WebhookPayloadError::Malformed { .. }) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Message(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(?self);
        } else {
            tracing::debug!(?self, %status, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
