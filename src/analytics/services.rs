use std::collections::HashMap;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

const WINDOW: Duration = Duration::days(7);

/// Mood label -> number of the user's entries created in the trailing week.
pub async fn weekly_mood_counts(st: &AppState, user_id: Uuid) -> Result<HashMap<String, i64>, ApiError> {
    weekly_mood_counts_at(st, user_id, OffsetDateTime::now_utc()).await
}

pub(crate) async fn weekly_mood_counts_at(
    st: &AppState,
    user_id: Uuid,
    now: OffsetDateTime,
) -> Result<HashMap<String, i64>, ApiError> {
    let rows = st.entries.mood_counts(user_id, now - WINDOW, now).await?;
    Ok(rows.into_iter().collect())
}
