use axum::{
    response::{IntoResponse, Response},
    Json,
};
use speakbook_core::{ApiResponse, SpeakBookError};
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

/// Boundary error rendered as a failure envelope.
///
/// The transport status stays 200 for domain-level failures; the caller
/// reads `success` and `message` from the envelope instead of the HTTP
/// status line.
#[derive(Debug)]
pub struct AppError {
    pub message: String,
}

impl AppError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<SpeakBookError> for AppError {
    fn from(err: SpeakBookError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Json(ApiResponse::<()>::fail(self.message)).into_response()
    }
}
