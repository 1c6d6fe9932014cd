//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; the response body is always the standard
//! `{success, message}` envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use meridian_core::QuantityError;

use crate::db::RepositoryError;
use crate::response::ApiResponse;

/// Application-level error type for the storefront API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session read/write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client input failed validation; rejected before any mutation.
    #[error("Validation failed on {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl From<QuantityError> for AppError {
    fn from(err: QuantityError) -> Self {
        Self::Validation {
            field: "quantity",
            message: err.to_string(),
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Session(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Session(_) => "Internal server error".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Validation { field, message } => format!("{field}: {message}"),
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("variant 123".to_string());
        assert_eq!(err.to_string(), "Not found: variant 123");

        let err = AppError::Validation {
            field: "quantity",
            message: "out of range".to_string(),
        };
        assert_eq!(err.to_string(), "Validation failed on quantity: out of range");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("cart".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Validation {
                field: "quantity",
                message: "bad".to_string(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn quantity_error_maps_to_validation() {
        let err = AppError::from(QuantityError(100));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "quantity"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn database_details_are_not_exposed() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "cart 7 holds quantity 0".to_string(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
