//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use inksync_domain::error::{InkSyncError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<inksync_domain::error::FieldError>,
}

/// Maps [`InkSyncError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(InkSyncError);

impl From<InkSyncError> for ApiError {
    fn from(err: InkSyncError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, fields) = match self.0 {
            InkSyncError::Validation(err) => {
                let fields = match &err {
                    ValidationError::InvalidConfig { errors, .. } => errors.clone(),
                    _ => Vec::new(),
                };
                (StatusCode::BAD_REQUEST, err.to_string(), fields)
            }
            InkSyncError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), Vec::new()),
            InkSyncError::Execution(err) => (StatusCode::BAD_GATEWAY, err.to_string(), Vec::new()),
            InkSyncError::Cancelled(err) => (StatusCode::CONFLICT, err.to_string(), Vec::new()),
            InkSyncError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    Vec::new(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                fields,
            }),
        )
            .into_response()
    }
}
