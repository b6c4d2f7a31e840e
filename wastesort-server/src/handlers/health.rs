//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;
use wastesort_core::constants::APP_VERSION;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: APP_VERSION,
        model_loaded: state.pipeline.classifier().is_loaded(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
