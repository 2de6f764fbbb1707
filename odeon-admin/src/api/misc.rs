//! Placeholder acknowledgment endpoints
//!
//! Kept for surface compatibility with the legacy admin frontend, which
//! polls these while their features are under construction.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

async fn acknowledge() -> Json<Value> {
    Json(json!({ "message": "Good" }))
}

/// Build the placeholder routes (not admin-gated)
pub fn misc_routes() -> Router<AppState> {
    Router::new()
        .route("/api/books/view", get(acknowledge))
        .route("/api/books/view/count", get(acknowledge))
        .route("/api/faq", get(acknowledge))
}
