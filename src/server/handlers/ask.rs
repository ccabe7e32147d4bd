use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskPayload {
    pub question: String,
}

pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let answer = rag::answer_question(
        &state.store,
        state.llm.as_ref(),
        &state.settings,
        &payload.question,
    )
    .await?;

    Ok(Json(json!({ "answer": answer })))
}
