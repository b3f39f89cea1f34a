use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::chat::{ChatReply, ChatRequest};

/// Answer a league question. Backend failures fall back to a local answer,
/// so only a malformed request is an error.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }
    if request.league_id.trim().is_empty() {
        return Err(ApiError::BadRequest("league_id must not be empty".to_string()));
    }

    Ok(Json(state.chat.answer(&request).await))
}
