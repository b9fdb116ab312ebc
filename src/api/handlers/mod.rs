use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::{StatusCode, Uri},
    Json,
};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::RecordId;

pub mod platform;
pub mod review;
pub mod watchlist;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Fallback for requests that match no route
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}

/// Unwraps an id path segment. A segment that is not an id means no
/// resource lives at that path.
fn record_id(path: Result<Path<RecordId>, PathRejection>) -> AppResult<RecordId> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::RouteNotFound(rejection.body_text()))
}

/// Unwraps a JSON body, turning extractor rejections into API errors
fn payload(body: Result<Json<Value>, JsonRejection>) -> AppResult<Value> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(rejection)) => {
            Err(AppError::UnsupportedMediaType(rejection.body_text()))
        }
        Err(rejection) => Err(AppError::MalformedBody(rejection.body_text())),
    }
}
