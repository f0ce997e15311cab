//! Service metadata endpoints.

use axum::Json;
use serde_json::{json, Value};

/// Service banner.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Influract API - Contract Analyzer for Creators",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint for container orchestration.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
