use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use super::generator::{CompletionRequest, TextGenerator};

/// Minimum note length, in characters, for persistence and annotation.
pub const MIN_NOTE_CHARS: usize = 50;

pub const TRIGGER_PHRASES: [&str; 4] = ["suicide", "kill myself", "self harm", "want to die"];

pub const DISCLAIMER: &str = "If you're feeling unsafe or overwhelmed, please consider reaching out to someone you trust or a local support service.";

pub const FALLBACK: &str =
    "I'm having trouble connecting to my thoughts right now, but I'm listening.";

const SYSTEM_PROMPT: &str = "You are a supportive, non-clinical mental health assistant. Respond to the user's journal entry in 1-2 sentences. Maintain a calm tone. Avoid diagnosis. Avoid crisis instructions.";
const MAX_TOKENS: u32 = 60;
const TEMPERATURE: f32 = 0.7;

pub fn note_long_enough(note: &str) -> bool {
    note.chars().count() >= MIN_NOTE_CHARS
}

pub fn contains_trigger(note: &str) -> bool {
    let lower = note.to_lowercase();
    TRIGGER_PHRASES.iter().any(|p| lower.contains(p))
}

/// Produces the supportive comment stored alongside an entry.
#[derive(Clone)]
pub struct Annotator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Annotator {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// `None` for notes too short to annotate. Never fails: the safety gate
    /// answers with [`DISCLAIMER`] and any generation failure or timeout
    /// answers with [`FALLBACK`].
    pub async fn annotate(&self, note: &str) -> Option<String> {
        if !note_long_enough(note) {
            return None;
        }

        if contains_trigger(note) {
            info!("trigger phrase detected, returning disclaimer");
            return Some(DISCLAIMER.to_string());
        }

        let req = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: note.to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let text = match tokio::time::timeout(self.timeout, self.generator.complete(&req)).await {
            Ok(Ok(text)) => text.trim().to_string(),
            Ok(Err(e)) => {
                warn!(error = %e, "annotation generation failed");
                return Some(FALLBACK.to_string());
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "annotation generation timed out");
                return Some(FALLBACK.to_string());
            }
        };

        if text.is_empty() {
            warn!("annotation generation returned empty text");
            return Some(FALLBACK.to_string());
        }
        Some(text)
    }
}
