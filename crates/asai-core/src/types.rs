//! Core types for Asai — turns, conversations and the remote history shape.
//!
//! A [`Conversation`] is the append-only list of [`Turn`]s kept per browser
//! session. [`HistoryEntry`] is the `role + parts` shape the remote text model
//! expects, built from the turns that precede a new user message.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Turns
// ─────────────────────────────────────────────

/// Who produced a turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Wire name (`"user"` / `"model"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Image produced for a synthesized render turn, if a real provider ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Set for turns produced locally by an image synthesizer rather than
    /// by the remote model.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthesized: bool,
}

impl Turn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Turn {
            role: Role::User,
            text: text.into(),
            image_url: None,
            synthesized: false,
        }
    }

    /// Create a model turn (a reply from the remote text model).
    pub fn model(text: impl Into<String>) -> Self {
        Turn {
            role: Role::Model,
            text: text.into(),
            image_url: None,
            synthesized: false,
        }
    }

    /// Create a locally synthesized model turn (render placeholder or image).
    pub fn synthesized(text: impl Into<String>) -> Self {
        Turn {
            role: Role::Model,
            text: text.into(),
            image_url: None,
            synthesized: true,
        }
    }

    /// Attach an image URL.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

/// Ordered, append-only sequence of turns.
///
/// Turns are never edited or removed; resetting a session replaces the whole
/// conversation with an empty one.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Translate every turn into the remote history shape.
    pub fn to_history(&self) -> Vec<HistoryEntry> {
        self.turns.iter().map(HistoryEntry::from).collect()
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Conversation { turns }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

// ─────────────────────────────────────────────
// Remote history shape
// ─────────────────────────────────────────────

/// One prior turn as sent to the remote model: a role plus text parts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub role: Role,
    pub parts: Vec<Part>,
}

/// A text part of a history entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub text: String,
}

impl HistoryEntry {
    /// Create a single-part entry.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        HistoryEntry {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl From<&Turn> for HistoryEntry {
    fn from(turn: &Turn) -> Self {
        HistoryEntry::text(turn.role, turn.text.clone())
    }
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// A successful reply from a text model provider.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Generated text.
    pub content: String,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
}

/// Token usage statistics from the model.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// A browser session with its conversation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub key: String,
    pub conversation: Conversation,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    /// Create a new empty session.
    pub fn new(key: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Session {
            key: key.into(),
            conversation: Conversation::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
