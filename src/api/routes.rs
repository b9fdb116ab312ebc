use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{self, platform, review, watchlist};
use super::AppState;
use crate::middleware::{
    make_span_with_request_id, method_not_allowed_detail, request_id_middleware,
};

/// Creates the main API router with all routes mounted at the root
pub fn create_router(state: AppState) -> Router {
    with_prefix(state, "")
}

/// Creates the router with the resource routes nested under `prefix`.
/// An empty prefix or `/` mounts them at the root.
pub fn with_prefix(state: AppState, prefix: &str) -> Router {
    let prefix = prefix.trim_matches('/');
    let resources = if prefix.is_empty() {
        resource_routes()
    } else {
        Router::new().nest(&format!("/{prefix}"), resource_routes())
    };

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(resources)
        .fallback(handlers::route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(middleware::map_response(method_not_allowed_detail)),
        )
        .with_state(state)
}

fn resource_routes() -> Router<AppState> {
    Router::new()
        // Watchlist entries
        .route(
            "/list/",
            get(watchlist::list_entries).post(watchlist::create_entry),
        )
        .route(
            "/:id/",
            get(watchlist::get_entry)
                .put(watchlist::replace_entry)
                .delete(watchlist::delete_entry),
        )
        // Streaming platforms
        .route(
            "/stream/",
            get(platform::list_platforms).post(platform::create_platform),
        )
        .route(
            "/stream/:id/",
            get(platform::get_platform)
                .put(platform::replace_platform)
                .delete(platform::delete_platform),
        )
        // Reviews
        .route("/review/", get(review::list_reviews).post(review::create_review))
        .route(
            "/review/:id/",
            get(review::get_review)
                .put(review::replace_review)
                .delete(review::delete_review),
        )
}
