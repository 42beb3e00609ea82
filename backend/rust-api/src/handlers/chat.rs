use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    models::{chat::ChatRequest, completion::CompletionResponse},
    services::AppState,
};

use super::ApiError;

/// POST /api/ai - ask the tutor, relays the upstream completion envelope as-is
pub async fn chat(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::bad_request(format!("Validation error: {}", e)))?;

    match state.chat.reply(req.messages).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Chat tutor request failed: {}", e);
            Err(ApiError::internal("Internal Server Error", None))
        }
    }
}
