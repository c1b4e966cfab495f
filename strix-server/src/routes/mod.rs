pub mod v1;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::infra::app_state::AppState;

/// Assemble the full API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1::create_v1_router(state.clone()))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
