use axum::extract::State;
use axum::Json;

use crate::api::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once configuration has loaded; reports what is being watched.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ready",
        "watchedAddress": state.config.watched_address.as_str(),
        "tokenMint": state.config.token_mint.as_str(),
    }))
}
