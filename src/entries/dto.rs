use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo_types::Entry,
    services::{EntryChanges, NewEntry},
};

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub mood: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub mood: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub mood: String,
    pub tags: Option<Vec<String>>,
    pub note: String,
    pub ai_response: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}

impl From<Entry> for EntryResponse {
    fn from(e: Entry) -> Self {
        Self {
            id: e.id,
            mood: e.mood,
            tags: e.tags,
            note: e.note,
            ai_response: e.ai_response,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl From<CreateEntryRequest> for NewEntry {
    fn from(r: CreateEntryRequest) -> Self {
        Self {
            mood: r.mood,
            note: r.note,
            tags: r.tags,
        }
    }
}

impl From<UpdateEntryRequest> for EntryChanges {
    fn from(r: UpdateEntryRequest) -> Self {
        Self {
            mood: r.mood,
            note: r.note,
            tags: r.tags,
        }
    }
}
