//! Health check endpoints

use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::http::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
}

pub async fn index() -> impl IntoResponse {
    Json(json!({ "handler": "index" }))
}

/// Always OK while the server is running
pub async fn health_check() -> impl IntoResponse {
    "OK"
}
