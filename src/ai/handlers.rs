use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::annotator::note_long_enough;
use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct VibeCheckResponse {
    pub ai_response: Option<String>,
}

pub fn ai_routes() -> Router<AppState> {
    Router::new().route("/ai/vibe-check", post(vibe_check))
}

/// Ad hoc annotation of a note that is not persisted. The body must be a
/// non-empty JSON object; `{}` is rejected like an unparsable body.
#[instrument(skip(state, payload))]
pub async fn vibe_check(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VibeCheckResponse>, ApiError> {
    let Json(body) = payload.map_err(|_| ApiError::InvalidRequest)?;
    let fields = body
        .as_object()
        .filter(|o| !o.is_empty())
        .ok_or(ApiError::InvalidRequest)?;
    let note = fields
        .get("note")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or(ApiError::MissingNote)?;
    if !note_long_enough(note) {
        return Err(ApiError::NoteTooShort);
    }

    let ai_response = state.annotator.annotate(note).await;
    Ok(Json(VibeCheckResponse { ai_response }))
}
