//! In-memory stand-ins for the Postgres stores and the generation API.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    ai::generator::{CompletionRequest, TextGenerator},
    auth::{repo::UserStore, repo_types::User},
    entries::{
        repo::EntryStore,
        repo_types::{CreatedRange, Entry},
    },
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(Some(user))
    }
}

#[derive(Default)]
pub struct MemoryEntryStore {
    entries: Mutex<Vec<Entry>>,
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn insert(&self, entry: Entry) -> anyhow::Result<Entry> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, user_id: Uuid, range: CreatedRange) -> anyhow::Result<Vec<Entry>> {
        let mut out: Vec<Entry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| range.from.map_or(true, |f| e.created_at >= f))
            .filter(|e| range.to.map_or(true, |t| e.created_at <= t))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<Option<Entry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .find(|e| e.id == entry_id && e.user_id == user_id)
            .cloned())
    }

    async fn update(&self, entry: Entry) -> anyhow::Result<Option<Entry>> {
        let mut entries = self.entries.lock().unwrap();
        let Some(slot) = entries
            .iter_mut()
            .find(|e| e.id == entry.id && e.user_id == entry.user_id)
        else {
            return Ok(None);
        };
        slot.mood = entry.mood;
        slot.note = entry.note;
        slot.tags = entry.tags;
        slot.ai_response = entry.ai_response;
        slot.updated_at = entry.updated_at;
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| !(e.id == entry_id && e.user_id == user_id));
        Ok(entries.len() != before)
    }

    async fn mood_counts(
        &self,
        user_id: Uuid,
        after: OffsetDateTime,
        until: OffsetDateTime,
    ) -> anyhow::Result<Vec<(String, i64)>> {
        let entries = self.entries.lock().unwrap();
        let mut counts: Vec<(String, i64)> = Vec::new();
        for e in entries
            .iter()
            .filter(|e| e.user_id == user_id && e.created_at > after && e.created_at <= until)
        {
            match counts.iter_mut().find(|(m, _)| *m == e.mood) {
                Some((_, n)) => *n += 1,
                None => counts.push((e.mood.clone(), 1)),
            }
        }
        Ok(counts)
    }
}

/// Generator double that answers with a configurable reply (or an error)
/// and records how often it was called.
pub struct ScriptedGenerator {
    reply: Mutex<Option<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last: Mutex<Option<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Mutex::new(Some(reply.to_string())),
            delay: None,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Mutex::new(None),
            ..Self::replying("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = Some(reply.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, req: &CompletionRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(req.clone());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let reply = self.reply.lock().unwrap().clone();
        reply.ok_or_else(|| anyhow::anyhow!("scripted generation failure"))
    }
}
