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
use crate::serializers::watchlist;

fn not_found(id: RecordId) -> AppError {
    AppError::NotFound {
        entity: "WatchlistEntry",
        id,
    }
}

/// GET /list/
pub async fn list_entries(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let entries = state.watchlist.list().await?;
    Ok(Json(entries.iter().map(watchlist::to_json).collect()))
}

/// POST /list/
///
/// `active` defaults to true and `created` is stamped by the store.
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let input = watchlist::validate(&payload(body)?)?;
    let entry = state.watchlist.create(input).await?;

    tracing::info!(
        request_id = %request_id,
        entry_id = entry.id,
        platform_id = entry.platform_id,
        "Watchlist entry created"
    );

    Ok((StatusCode::CREATED, Json(watchlist::to_json(&entry))))
}

/// GET /{id}/
pub async fn get_entry(
    State(state): State<AppState>,
    path: Result<Path<RecordId>, PathRejection>,
) -> AppResult<Json<Value>> {
    let id = record_id(path)?;
    let entry = state.watchlist.get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(watchlist::to_json(&entry)))
}

/// PUT /{id}/
///
/// Title, platform and storyline must be resupplied; an absent `active`
/// keeps its stored value.
pub async fn replace_entry(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let id = record_id(path)?;
    state.watchlist.get(id).await?.ok_or_else(|| not_found(id))?;

    let input = watchlist::validate(&payload(body)?)?;
    let entry = state
        .watchlist
        .update(id, input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(request_id = %request_id, entry_id = id, "Watchlist entry replaced");

    Ok(Json(watchlist::to_json(&entry)))
}

/// DELETE /{id}/
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<RecordId>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = record_id(path)?;
    if !state.watchlist.delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(request_id = %request_id, entry_id = id, "Watchlist entry deleted");

    Ok(StatusCode::NO_CONTENT)
}
