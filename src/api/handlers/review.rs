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
use crate::serializers::review;

fn not_found(id: RecordId) -> AppError {
    AppError::NotFound {
        entity: "Review",
        id,
    }
}

pub async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let reviews = state.reviews.list().await?;
    Ok(Json(reviews.iter().map(review::to_json).collect()))
}

pub async fn create_review(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let input = review::validate(&payload(body)?)?;
    let created = state.reviews.create(input).await?;

    tracing::info!(
        request_id = %request_id,
        review_id = created.id,
        entry_id = created.watchlist_id,
        "Review created"
    );

    Ok((StatusCode::CREATED, Json(review::to_json(&created))))
}

pub async fn get_review(
    State(state): State<AppState>,
    path: Result<Path<RecordId>, PathRejection>,
) -> AppResult<Json<Value>> {
    let id = record_id(path)?;
    let found = state.reviews.get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(review::to_json(&found)))
}

pub async fn replace_review(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let id = record_id(path)?;
    state.reviews.get(id).await?.ok_or_else(|| not_found(id))?;

    let input = review::validate(&payload(body)?)?;
    let updated = state
        .reviews
        .update(id, input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(request_id = %request_id, review_id = id, "Review replaced");

    Ok(Json(review::to_json(&updated)))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<RecordId>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = record_id(path)?;
    if !state.reviews.delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(request_id = %request_id, review_id = id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}
