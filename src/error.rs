use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// The `book` query parameter is missing or not a non-negative integer.
    #[error("Invalid book id: {0:?}")]
    InvalidBookId(String),

    /// The `chapter` query parameter is missing or not a non-negative integer.
    #[error("Invalid chapter number: {0:?}")]
    InvalidChapterNumber(String),

    /// No row matched a single-entity lookup.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection or query failure in the relational store.
    #[error("Store error: {0}")]
    Store(String),

    /// Response serialization failure.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The request deadline passed before the store answered.
    #[error("Deadline exceeded: {0}")]
    Timeout(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBookId(_) | AppError::InvalidChapterNumber(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed message shown to clients. Details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::InvalidBookId(_) => "Invalid Book ID",
            AppError::InvalidChapterNumber(_) => "Invalid Chapter Number",
            AppError::NotFound(_) => "Chapter Not Found",
            // Existing clients match on this exact string.
            AppError::Store(_) => "Internal MySQL Error",
            AppError::Encoding(_) => "Internal JSON Error",
            AppError::Timeout(_) => "Request Timed Out",
            AppError::Config(_) | AppError::Internal(_) => "Internal Server Error",
        }
    }
}

/// JSON error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Public error message.
    pub error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
