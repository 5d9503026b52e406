//! Common error type and HTTP mapping.
//!
//! Every fallible step of the conversion pipeline (validation, upstream call,
//! persistence) returns an `AppError` so the HTTP surface can map error kind
//! to status code in one place. Upstream and filesystem failures surface a
//! generic message to the caller; the detail is logged internally.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid file type. Please upload PNG, JPG, JPEG, GIF, BMP, or WebP")]
    UnsupportedType(String),

    #[error("File too large. Maximum size is 10MB")]
    TooLarge(usize),

    #[error("GenAI client not initialized")]
    ClientNotInitialized,

    #[error("Failed to reach the image generation service")]
    Network(#[from] reqwest::Error),

    #[error("Image generation quota exceeded, please try again later")]
    QuotaExceeded,

    #[error("The model returned no image")]
    NoImageReturned,

    #[error("Image generation service error")]
    Upstream(String),

    #[error("Failed to store the generated image")]
    Write(#[from] std::io::Error),

    #[error("File not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::UnsupportedType(_) | AppError::TooLarge(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ClientNotInitialized
            | AppError::Network(_)
            | AppError::QuotaExceeded
            | AppError::NoImageReturned
            | AppError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::UnsupportedType(name) => {
                tracing::warn!("Rejected upload with unsupported type: {}", name)
            }
            AppError::TooLarge(size) => {
                tracing::warn!("Rejected upload of {} bytes", size)
            }
            AppError::Network(err) => tracing::error!("Upstream request failed: {}", err),
            AppError::Upstream(detail) => tracing::error!("Upstream error: {}", detail),
            AppError::Write(err) => tracing::error!("Output write failed: {}", err),
            AppError::NotFound(name) => tracing::debug!("Output not found: {}", name),
            _ => {}
        }
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
