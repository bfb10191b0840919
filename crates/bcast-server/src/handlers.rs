// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP request handlers.
//!
//! Bodies are taken as raw bytes and decoded through `bcast_proto::decode`
//! so every malformed payload maps to a 400 with the same error shape.

use crate::service::ServiceError;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bcast_proto::{AcknowledgmentReport, BroadcastRequest, DeliveryResult, Registration, StatusView};
use serde::Serialize;
use tracing::error;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let code = match &err {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotRegistered(_) => StatusCode::NOT_FOUND,
            ServiceError::Emit(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if code.is_server_error() {
            error!("{}", err);
        }
        Self {
            error: err.to_string(),
            code: code.as_u16(),
        }
    }
}

impl From<bcast_proto::ValidationError> for ApiError {
    fn from(err: bcast_proto::ValidationError) -> Self {
        ServiceError::from(err).into()
    }
}

/// POST /register
pub async fn register(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let registration: Registration = bcast_proto::decode(&body)?;
    service.register(registration)?;
    Ok(StatusCode::OK)
}

/// POST /report
pub async fn report(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let report: AcknowledgmentReport = bcast_proto::decode(&body)?;
    service.submit_acknowledgment(&report)?;
    Ok(StatusCode::OK)
}

/// GET /status
pub async fn status(State(service): State<AppState>) -> Json<StatusView> {
    Json(service.status())
}

/// POST /broadcast - responds once the acknowledgment window has closed
pub async fn broadcast(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<Json<DeliveryResult>, ApiError> {
    let request = BroadcastRequest::from_body(&body)?;
    let result = service.trigger_broadcast(&request).await?;
    Ok(Json(result))
}

/// GET /health
pub async fn health() -> Response {
    let info = serde_json::json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, Json(info)).into_response()
}
