use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use validator::Validate;

use crate::core::errors::ApiError;
use crate::mail::EmailPayload;
use crate::rag;
use crate::state::AppState;

pub async fn store_email(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmailPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let outcome =
        rag::ingest_email(&state.store, state.llm.as_ref(), &state.settings, &payload).await?;

    Ok(Json(json!({
        "message": "Email stored successfully!",
        "email_id": outcome.email_id,
        "sections": outcome.sections,
    })))
}

pub async fn list_emails(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let emails = state.store.list_emails().await?;
    Ok(Json(json!({ "emails": emails })))
}

pub async fn get_email(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .store
        .get_email(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("email {id} not found")))?;

    Ok(Json(detail))
}
