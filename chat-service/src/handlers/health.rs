use crate::dtos::{iso_timestamp, ServiceStatusResponse};
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use service_core::error::AppError;

/// `GET /`.
pub async fn service_status() -> Json<ServiceStatusResponse> {
    Json(ServiceStatusResponse {
        message: "Yoga trainer chat service",
        status: "running",
        timestamp: iso_timestamp(Utc::now()),
    })
}

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "chat-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");

            let mut body = json!({
                "status": "unhealthy",
                "service": "chat-service"
            });
            if state.config.environment.exposes_error_details() {
                body["error"] = json!(e.to_string());
            }

            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}

/// Readiness check endpoint for K8s readiness probes.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match state.store.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Catch-all for unmatched paths and methods.
pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}
