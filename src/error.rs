use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use tracing::{error, warn};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad or missing parameter: {0}")]
    BadRequest(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl AppError {
    /// Status code and the fixed, caller-facing message for this error.
    ///
    /// The detail carried by the variant is for the server log only.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad or missing parameter"),
            AppError::UserNotFound(_) => (StatusCode::BAD_REQUEST, "Invalid username"),
            AppError::Upstream(_) | AppError::Timeout(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Information could not be retrieved from Github",
            ),
            AppError::Internal(_) | AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Your request could not be processed",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        match &self {
            AppError::BadRequest(_) | AppError::UserNotFound(_) => warn!("Rejected request: {}", self),
            AppError::Upstream(_) | AppError::Timeout(_) => warn!("{}", self),
            AppError::Internal(_) | AppError::Config(_) => error!("{}", self),
        }

        response::error(status, message).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("malformed JSON: {}", err))
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
