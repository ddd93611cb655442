use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::services::weekly_mood_counts;
use crate::{auth::AuthUser, error::ApiError, state::AppState};

pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/analytics/weekly", get(weekly))
}

#[instrument(skip(state))]
pub async fn weekly(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<HashMap<String, i64>>, ApiError> {
    Ok(Json(weekly_mood_counts(&state, user_id).await?))
}
