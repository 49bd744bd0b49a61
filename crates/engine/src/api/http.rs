//! Router assembly.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::{chat_routes, registry_routes};
use crate::app::App;

pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_routes::chat_turn))
        .route("/api/group-chat", post(chat_routes::group_turn))
        .route("/api/group-context", post(chat_routes::group_context))
        .route("/api/characters", get(registry_routes::list_characters))
        .route("/api/characters/{id}", get(registry_routes::get_character))
        .route(
            "/api/locations/{map}/{location}",
            get(registry_routes::location_view),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
