use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::StoreError;
use crate::models::RecordId;
use crate::serializers::{missing_parent_message, ValidationErrors};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: RecordId },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("JSON parse error - {0}")]
    MalformedBody(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// No route matched, or a path segment was not a valid id
    #[error("No route: {0}")]
    RouteNotFound(String),

    #[error("Method \"{0}\" not allowed.")]
    MethodNotAllowed(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            AppError::Store(StoreError::MissingParent { field, id }) => {
                let errors = ValidationErrors::single(field, missing_parent_message(id));
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            AppError::NotFound { .. } | AppError::RouteNotFound(_) => {
                detail(StatusCode::NOT_FOUND, "Not found.")
            }
            AppError::MalformedBody(_) => detail(StatusCode::BAD_REQUEST, &self.to_string()),
            AppError::UnsupportedMediaType(_) => {
                detail(StatusCode::UNSUPPORTED_MEDIA_TYPE, &self.to_string())
            }
            AppError::MethodNotAllowed(_) => {
                detail(StatusCode::METHOD_NOT_ALLOWED, &self.to_string())
            }
            AppError::Store(StoreError::Database(err)) => {
                tracing::error!(error = %err, "Database error");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.")
            }
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                AppError::Validation(ValidationErrors::single("title", "This field is required.")),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound {
                    entity: "WatchlistEntry",
                    id: 5,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Store(StoreError::MissingParent {
                    field: "platform",
                    id: 9,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::MalformedBody("expected value".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::UnsupportedMediaType("expected application/json".to_string()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AppError::RouteNotFound("/nowhere".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::MethodNotAllowed("PATCH".to_string()),
                StatusCode::METHOD_NOT_ALLOWED,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_message() {
        let error = AppError::NotFound {
            entity: "Platform",
            id: 3,
        };
        assert_eq!(error.to_string(), "Platform 3 not found");
    }

    #[test]
    fn test_method_not_allowed_message() {
        let error = AppError::MethodNotAllowed("DELETE".to_string());
        assert_eq!(error.to_string(), "Method \"DELETE\" not allowed.");
    }
}
