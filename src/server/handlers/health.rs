use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let emails = state.store.email_count().await?;
    let sections = state.store.section_count().await?;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);

    Ok(Json(json!({
        "status": "ok",
        "emails": emails,
        "sections": sections,
        "embedding_model": state.settings.openai.embedding_model,
        "chat_model": state.settings.openai.chat_model,
        "uptime_secs": uptime_secs,
    })))
}
