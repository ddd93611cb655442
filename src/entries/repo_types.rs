use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Journal entry row. `note` is at least 50 characters whenever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: String,
    pub note: String,
    pub tags: Option<Vec<String>>,
    pub ai_response: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Inclusive creation-time bounds for listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatedRange {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
}
