use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use super::{payload, record_id};
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::RecordId;
use crate::serializers::platform;

fn not_found(id: RecordId) -> AppError {
    AppError::NotFound {
        entity: "Platform",
        id,
    }
}

/// GET /stream/
///
/// Every platform with its watchlist entries embedded.
pub async fn list_platforms(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let platforms = state.platforms.list_with_entries().await?;

    let body: Vec<Value> = platforms
        .iter()
        .map(|(p, entries)| platform::to_json(p, entries))
        .collect();

    Ok(Json(body))
}

/// POST /stream/
pub async fn create_platform(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let input = platform::validate(&payload(body)?)?;
    let created = state.platforms.create(input).await?;

    tracing::info!(
        request_id = %request_id,
        platform_id = created.id,
        name = %created.name,
        "Platform created"
    );

    Ok((StatusCode::CREATED, Json(platform::to_json(&created, &[]))))
}

/// GET /stream/{id}/
pub async fn get_platform(
    State(state): State<AppState>,
    path: Result<Path<RecordId>, PathRejection>,
) -> AppResult<Json<Value>> {
    let id = record_id(path)?;
    let found = state.platforms.get(id).await?.ok_or_else(|| not_found(id))?;
    let entries = state.watchlist.list_by_platform(id).await?;

    Ok(Json(platform::to_json(&found, &entries)))
}

/// PUT /stream/{id}/
///
/// Full replace: name, about and website must all be supplied.
pub async fn replace_platform(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let id = record_id(path)?;
    state.platforms.get(id).await?.ok_or_else(|| not_found(id))?;

    let input = platform::validate(&payload(body)?)?;
    let updated = state
        .platforms
        .update(id, input)
        .await?
        .ok_or_else(|| not_found(id))?;
    let entries = state.watchlist.list_by_platform(id).await?;

    tracing::info!(request_id = %request_id, platform_id = id, "Platform replaced");

    Ok(Json(platform::to_json(&updated, &entries)))
}

/// DELETE /stream/{id}/
///
/// Also removes the platform's entries and their reviews.
pub async fn delete_platform(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<RecordId>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = record_id(path)?;
    if !state.platforms.delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(request_id = %request_id, platform_id = id, "Platform deleted");

    Ok(StatusCode::NO_CONTENT)
}
