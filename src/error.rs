//! Error types for the fonts server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tokio::task::JoinError;

use crate::models::ErrorResponse;

// == Parallel Map Error ==
/// Failure of [`TtlCache::parallel_map`](crate::cache::TtlCache::parallel_map).
#[derive(Error, Debug)]
pub enum ParallelMapError<E> {
    /// A worker returned an error
    #[error("worker failed: {0}")]
    Worker(E),

    /// A worker panicked or was cancelled
    #[error("worker did not complete: {0}")]
    Join(JoinError),
}

// == App Error Enum ==
/// Unified error type for the fonts server.
#[derive(Error, Debug)]
pub enum AppError {
    /// No provider registered under this id
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Font family missing from the metadata cache
    #[error("Font family not found: {0}")]
    FamilyNotFound(String),

    /// Family exists but has no such variant
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Family has no license on disk
    #[error("License not found: {0}")]
    LicenseNotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A remote answered with an unexpected status or error body
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Transport failure talking to a remote
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Downloaded bytes are not a usable font
    #[error("Invalid font data: {0}")]
    InvalidFont(String),

    /// Preview could not be drawn or encoded
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status reported to clients for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ProviderNotFound(_)
            | AppError::FamilyNotFound(_)
            | AppError::VariantNotFound(_)
            | AppError::LicenseNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidFont(_)
            | AppError::Render(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ParallelMapError<AppError>> for AppError {
    fn from(err: ParallelMapError<AppError>) -> Self {
        match err {
            ParallelMapError::Worker(inner) => inner,
            ParallelMapError::Join(join) => AppError::Internal(join.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the fonts server.
pub type Result<T> = std::result::Result<T, AppError>;
