use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{CreatedRange, Entry};

/// Every lookup is scoped by owner: an entry owned by someone else behaves
/// exactly like a missing one.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn insert(&self, entry: Entry) -> anyhow::Result<Entry>;
    /// Newest first.
    async fn list(&self, user_id: Uuid, range: CreatedRange) -> anyhow::Result<Vec<Entry>>;
    async fn get(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<Option<Entry>>;
    /// Writes mutable columns back; `None` when the row no longer exists.
    async fn update(&self, entry: Entry) -> anyhow::Result<Option<Entry>>;
    /// `false` when nothing was deleted.
    async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool>;
    /// Mood counts for entries with `after < created_at <= until`.
    async fn mood_counts(
        &self,
        user_id: Uuid,
        after: OffsetDateTime,
        until: OffsetDateTime,
    ) -> anyhow::Result<Vec<(String, i64)>>;
}

#[derive(Clone)]
pub struct PgEntryStore {
    db: PgPool,
}

impl PgEntryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn insert(&self, entry: Entry) -> anyhow::Result<Entry> {
        let row = sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (id, user_id, mood, note, tags, ai_response, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, mood, note, tags, ai_response, created_at, updated_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.mood)
        .bind(&entry.note)
        .bind(&entry.tags)
        .bind(&entry.ai_response)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .fetch_one(&self.db)
        .await
        .context("insert entry")?;
        Ok(row)
    }

    async fn list(&self, user_id: Uuid, range: CreatedRange) -> anyhow::Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, user_id, mood, note, tags, ai_response, created_at, updated_at
            FROM entries
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.db)
        .await
        .context("list entries")?;
        Ok(rows)
    }

    async fn get(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<Option<Entry>> {
        let row = sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, user_id, mood, note, tags, ai_response, created_at, updated_at
            FROM entries
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get entry")?;
        Ok(row)
    }

    async fn update(&self, entry: Entry) -> anyhow::Result<Option<Entry>> {
        let row = sqlx::query_as::<_, Entry>(
            r#"
            UPDATE entries
               SET mood = $3, note = $4, tags = $5, ai_response = $6, updated_at = $7
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, mood, note, tags, ai_response, created_at, updated_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.mood)
        .bind(&entry.note)
        .bind(&entry.tags)
        .bind(&entry.ai_response)
        .bind(entry.updated_at)
        .fetch_optional(&self.db)
        .await
        .context("update entry")?;
        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete entry")?;
        Ok(res.rows_affected() > 0)
    }

    async fn mood_counts(
        &self,
        user_id: Uuid,
        after: OffsetDateTime,
        until: OffsetDateTime,
    ) -> anyhow::Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT mood, COUNT(*)
              FROM entries
             WHERE user_id = $1 AND created_at > $2 AND created_at <= $3
             GROUP BY mood
            "#,
        )
        .bind(user_id)
        .bind(after)
        .bind(until)
        .fetch_all(&self.db)
        .await
        .context("weekly mood counts")?;
        Ok(rows)
    }
}
