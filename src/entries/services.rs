use time::{
    format_description::well_known::Iso8601, Date, OffsetDateTime, PrimitiveDateTime,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::repo_types::{CreatedRange, Entry};
use crate::{ai::annotator::note_long_enough, error::ApiError, state::AppState};

const MAX_MOOD_CHARS: usize = 50;

#[derive(Debug, Default)]
pub struct NewEntry {
    pub mood: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Default)]
pub struct EntryChanges {
    pub mood: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Parses a list bound: full ISO 8601 date-time with offset, a naive
/// date-time taken as UTC, or a plain date at midnight UTC.
pub fn parse_bound(raw: &str) -> Result<OffsetDateTime, ApiError> {
    let raw = raw.trim();
    let normalized = match raw.split_once(' ') {
        Some((date, time)) if !time.is_empty() => format!("{date}T{time}"),
        _ => raw.to_string(),
    };

    if let Ok(dt) = OffsetDateTime::parse(&normalized, &Iso8601::DEFAULT) {
        return Ok(dt);
    }
    if let Ok(dt) = PrimitiveDateTime::parse(&normalized, &Iso8601::DEFAULT) {
        return Ok(dt.assume_utc());
    }
    if let Ok(d) = Date::parse(&normalized, &Iso8601::DEFAULT) {
        return Ok(d.midnight().assume_utc());
    }
    Err(ApiError::InvalidDate)
}

fn check_mood(mood: &str) -> Result<(), ApiError> {
    if mood.chars().count() > MAX_MOOD_CHARS {
        return Err(ApiError::MoodTooLong);
    }
    Ok(())
}

pub async fn create_entry(st: &AppState, user_id: Uuid, new: NewEntry) -> Result<Entry, ApiError> {
    let mood = new.mood.map(|m| m.trim().to_string()).unwrap_or_default();
    let note = new.note.unwrap_or_default();
    if mood.is_empty() || note.trim().is_empty() {
        return Err(ApiError::MissingFields("Mood and note are required"));
    }
    if !note_long_enough(&note) {
        return Err(ApiError::NoteTooShort);
    }
    check_mood(&mood)?;

    let ai_response = st.annotator.annotate(&note).await;
    let now = OffsetDateTime::now_utc();
    let entry = Entry {
        id: Uuid::new_v4(),
        user_id,
        mood,
        note,
        tags: new.tags,
        ai_response,
        created_at: now,
        updated_at: now,
    };

    let entry = st.entries.insert(entry).await?;
    info!(entry_id = %entry.id, %user_id, mood = %entry.mood, "entry created");
    Ok(entry)
}

pub async fn list_entries(
    st: &AppState,
    user_id: Uuid,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Vec<Entry>, ApiError> {
    let range = CreatedRange {
        from: from.filter(|s| !s.is_empty()).map(parse_bound).transpose()?,
        to: to.filter(|s| !s.is_empty()).map(parse_bound).transpose()?,
    };
    let entries = st.entries.list(user_id, range).await?;
    debug!(%user_id, count = entries.len(), "entries listed");
    Ok(entries)
}

pub async fn get_entry(st: &AppState, user_id: Uuid, entry_id: Uuid) -> Result<Entry, ApiError> {
    st.entries
        .get(user_id, entry_id)
        .await?
        .ok_or(ApiError::EntryNotFound)
}

/// Applies `changes`; the annotation is regenerated only when the note text
/// actually differs from the stored one.
pub async fn update_entry(
    st: &AppState,
    user_id: Uuid,
    entry_id: Uuid,
    changes: EntryChanges,
) -> Result<Entry, ApiError> {
    let mut entry = get_entry(st, user_id, entry_id).await?;

    let mood = changes
        .mood
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    if let Some(m) = &mood {
        check_mood(m)?;
    }
    if let Some(n) = &changes.note {
        if !note_long_enough(n) {
            return Err(ApiError::NoteTooShort);
        }
    }

    let mut changed = false;
    if let Some(m) = mood {
        if m != entry.mood {
            entry.mood = m;
            changed = true;
        }
    }
    if let Some(tags) = changes.tags {
        if entry.tags.as_ref() != Some(&tags) {
            entry.tags = Some(tags);
            changed = true;
        }
    }
    if let Some(note) = changes.note {
        if note != entry.note {
            entry.ai_response = st.annotator.annotate(&note).await;
            entry.note = note;
            changed = true;
        }
    }

    if !changed {
        debug!(%entry_id, "update without changes");
        return Ok(entry);
    }

    entry.updated_at = OffsetDateTime::now_utc();
    let entry = st
        .entries
        .update(entry)
        .await?
        .ok_or(ApiError::EntryNotFound)?;
    info!(%entry_id, %user_id, "entry updated");
    Ok(entry)
}

pub async fn delete_entry(st: &AppState, user_id: Uuid, entry_id: Uuid) -> Result<(), ApiError> {
    if !st.entries.delete(user_id, entry_id).await? {
        return Err(ApiError::EntryNotFound);
    }
    info!(%entry_id, %user_id, "entry deleted");
    Ok(())
}
