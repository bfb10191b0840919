// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Route definitions.

use crate::handlers;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/report", post(handlers::report))
        .route("/status", get(handlers::status))
        .route("/broadcast", post(handlers::broadcast))
        .route("/health", get(handlers::health))
}

/// Full application router with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    api_routes()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
