//! Session caching with optional disk persistence.
//!
//! File format: JSONL in `{sessions_dir}/{safe_key}.jsonl`
//! - Line 1: `{"_type":"metadata","key":"...","created_at":"...","updated_at":"..."}`
//! - Line 2+: `{"role":"user","text":"hello"}`

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{DEFAULT_IDLE_TTL_SECS, DEFAULT_MAX_SESSIONS};
use crate::types::{Conversation, Session, Turn};
use crate::utils;

// ─────────────────────────────────────────────
// Session metadata (first line of JSONL)
// ─────────────────────────────────────────────

/// Metadata header written as the first line of each JSONL session file.
#[derive(Debug, Serialize, Deserialize)]
struct SessionMetadata {
    #[serde(rename = "_type")]
    record_type: String,
    key: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────
// SessionManager
// ─────────────────────────────────────────────

/// Per-browser conversation store.
///
/// Thread-safe via `RwLock`. When a sessions directory is set, every write is
/// mirrored to a JSONL file and cache misses are loaded back from disk.
///
/// Reads never create entries; only [`SessionManager::save`] does. Sessions
/// idle for longer than the TTL are dropped, and once the cap is reached the
/// least recently updated session is evicted. A zero TTL or cap disables that
/// bound.
pub struct SessionManager {
    /// Directory where `.jsonl` session files are stored (`None` = memory only).
    sessions_dir: Option<PathBuf>,
    /// In-memory cache of active sessions.
    cache: RwLock<HashMap<String, Session>>,
    /// Maximum number of cached sessions (0 = unbounded).
    max_sessions: usize,
    /// Idle time after which a session expires (0 = never).
    idle_ttl_secs: u64,
}

impl SessionManager {
    /// Create a memory-only session manager.
    pub fn in_memory() -> Self {
        SessionManager {
            sessions_dir: None,
            cache: RwLock::new(HashMap::new()),
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_ttl_secs: DEFAULT_IDLE_TTL_SECS,
        }
    }

    /// Create a session manager backed by JSONL files in `sessions_dir`.
    ///
    /// The directory is created if it doesn't exist.
    pub fn persistent(sessions_dir: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&sessions_dir)?;

        Ok(SessionManager {
            sessions_dir: Some(sessions_dir),
            cache: RwLock::new(HashMap::new()),
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_ttl_secs: DEFAULT_IDLE_TTL_SECS,
        })
    }

    /// Override the session cap and idle TTL.
    pub fn with_limits(mut self, max_sessions: usize, idle_ttl_secs: u64) -> Self {
        self.max_sessions = max_sessions;
        self.idle_ttl_secs = idle_ttl_secs;
        self
    }

    /// Whether sessions are written to disk.
    pub fn is_persistent(&self) -> bool {
        self.sessions_dir.is_some()
    }

    /// Idle TTL in seconds (0 = sessions never expire).
    pub fn idle_ttl_secs(&self) -> u64 {
        self.idle_ttl_secs
    }

    /// Number of sessions currently cached.
    pub fn len(&self) -> usize {
        self.cache.read().unwrap().len()
    }

    /// Whether the cache holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the stored session for `key`, or a fresh unsaved one.
    ///
    /// 1. Check in-memory cache
    /// 2. Try to load from disk
    /// 3. Return a new empty session (not stored until [`Self::save`])
    pub fn get_or_create(&self, key: &str) -> Session {
        self.lookup(key).unwrap_or_else(|| Session::new(key))
    }

    /// The conversation stored for `key` (empty for unknown keys).
    pub fn conversation(&self, key: &str) -> Conversation {
        self.lookup(key)
            .map(|session| session.conversation)
            .unwrap_or_default()
    }

    /// Replace the stored conversation for `key` and persist it.
    pub fn save(&self, key: &str, conversation: Conversation) {
        let mut session = self.get_or_create(key);
        session.conversation = conversation;
        session.updated_at = Utc::now();
        self.store(session);
    }

    /// Reset a session to an empty conversation.
    ///
    /// The stored entry is dropped; reads return an empty conversation until
    /// the next [`Self::save`].
    pub fn clear(&self, key: &str) {
        self.delete(key);
    }

    /// Delete a session entirely (from cache and disk).
    ///
    /// Returns `true` if the session existed.
    pub fn delete(&self, key: &str) -> bool {
        let cached = {
            let mut cache = self.cache.write().unwrap();
            cache.remove(key).is_some()
        };

        self.remove_file(key) || cached
    }

    /// Delete every session file on disk that has outlived the idle TTL.
    ///
    /// Returns the number of sessions removed. Memory-only managers expire
    /// cached entries lazily on write, so this is a no-op for them.
    pub fn prune_expired(&self) -> usize {
        let Some(dir) = &self.sessions_dir else {
            return 0;
        };

        let now = Utc::now();
        let expired: Vec<String> = Self::scan_dir(dir)
            .into_iter()
            .filter(|s| self.is_expired(s.updated_at, now))
            .map(|s| s.key)
            .collect();

        for key in &expired {
            self.delete(key);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "pruned expired sessions");
        }
        expired.len()
    }

    /// List known sessions, newest first.
    ///
    /// Persistent managers read the metadata line of every file on disk;
    /// memory-only managers list the cache.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut summaries = match &self.sessions_dir {
            Some(dir) => Self::scan_dir(dir),
            None => {
                let cache = self.cache.read().unwrap();
                cache
                    .values()
                    .map(|s| SessionSummary {
                        key: s.key.clone(),
                        turns: s.conversation.len(),
                        created_at: s.created_at,
                        updated_at: s.updated_at,
                        path: None,
                    })
                    .collect()
            }
        };

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    fn is_expired(&self, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.idle_ttl_secs > 0
            && now.signed_duration_since(updated_at).num_seconds() > self.idle_ttl_secs as i64
    }

    /// Find a live session without creating one.
    fn lookup(&self, key: &str) -> Option<Session> {
        let now = Utc::now();
        let cached = {
            let cache = self.cache.read().unwrap();
            cache.get(key).cloned()
        };

        let session = match cached {
            Some(session) => session,
            None => {
                let session = self.load_from_disk(key)?;
                if !self.is_expired(session.updated_at, now) {
                    self.insert_bounded(session.clone());
                }
                session
            }
        };

        if self.is_expired(session.updated_at, now) {
            debug!(session = %key, "session expired");
            self.delete(key);
            return None;
        }
        Some(session)
    }

    /// Insert into the cache, then enforce the TTL and the cap.
    ///
    /// Evicted sessions are removed from disk as well.
    fn insert_bounded(&self, session: Session) {
        let now = Utc::now();
        let evicted = {
            let mut cache = self.cache.write().unwrap();
            let key = session.key.clone();
            cache.insert(key.clone(), session);

            let mut evicted: Vec<String> = cache
                .values()
                .filter(|s| s.key != key && self.is_expired(s.updated_at, now))
                .map(|s| s.key.clone())
                .collect();
            for k in &evicted {
                cache.remove(k);
            }

            while self.max_sessions > 0 && cache.len() > self.max_sessions {
                let Some(oldest) = cache
                    .values()
                    .filter(|s| s.key != key)
                    .min_by_key(|s| s.updated_at)
                    .map(|s| s.key.clone())
                else {
                    break;
                };
                cache.remove(&oldest);
                evicted.push(oldest);
            }
            evicted
        };

        for key in &evicted {
            self.remove_file(key);
        }
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "evicted sessions");
        }
    }

    /// Remove the JSONL file for `key`, if any. Returns `true` if one existed.
    fn remove_file(&self, key: &str) -> bool {
        let Some(path) = self.session_path(key) else {
            return false;
        };
        if !path.exists() {
            return false;
        }
        if let Err(e) = std::fs::remove_file(&path) {
            warn!("Failed to delete session file: {}", e);
            return false;
        }
        debug!("Deleted session file: {}", path.display());
        true
    }

    fn scan_dir(dir: &Path) -> Vec<SessionSummary> {
        let mut summaries = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read sessions directory: {}", e);
                return summaries;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "jsonl") {
                continue;
            }

            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let mut lines = std::io::BufReader::new(file).lines();
            let Some(Ok(first)) = lines.next() else {
                continue;
            };
            let Ok(meta) = serde_json::from_str::<SessionMetadata>(&first) else {
                continue;
            };

            let turns = lines
                .map_while(Result::ok)
                .filter(|l| !l.trim().is_empty())
                .count();

            summaries.push(SessionSummary {
                key: meta.key,
                turns,
                created_at: meta.created_at,
                updated_at: meta.updated_at,
                path: Some(path.clone()),
            });
        }

        summaries
    }

    /// Update the cache and mirror to disk.
    fn store(&self, session: Session) {
        self.insert_bounded(session.clone());

        if let Err(e) = self.save_to_disk(&session) {
            warn!("Failed to persist session {}: {}", session.key, e);
        }
    }

    /// Get the JSONL file path for a session key.
    fn session_path(&self, key: &str) -> Option<PathBuf> {
        let dir = self.sessions_dir.as_ref()?;
        Some(dir.join(format!("{}.jsonl", utils::safe_filename(key))))
    }

    /// Load a session from a JSONL file.
    fn load_from_disk(&self, key: &str) -> Option<Session> {
        let path = self.session_path(key)?;
        if !path.exists() {
            return None;
        }

        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to open session file {}: {}", path.display(), e);
                return None;
            }
        };

        let reader = std::io::BufReader::new(file);
        let mut session = Session::new(key);
        let mut turns = Vec::new();

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => continue,
            };

            if line.trim().is_empty() {
                continue;
            }

            if let Ok(meta) = serde_json::from_str::<SessionMetadata>(&line) {
                if meta.record_type == "metadata" {
                    session.created_at = meta.created_at;
                    session.updated_at = meta.updated_at;
                    continue;
                }
            }

            match serde_json::from_str::<Turn>(&line) {
                Ok(turn) => turns.push(turn),
                Err(e) => warn!("Skipping bad turn in {}: {}", path.display(), e),
            }
        }

        session.conversation = Conversation::from(turns);
        debug!(
            "Loaded session '{}' with {} turns from disk",
            key,
            session.conversation.len()
        );
        Some(session)
    }

    /// Save a session to a JSONL file (overwrite). No-op when memory-only.
    fn save_to_disk(&self, session: &Session) -> std::io::Result<()> {
        let Some(path) = self.session_path(&session.key) else {
            return Ok(());
        };

        let mut file = std::fs::File::create(&path)?;

        let meta = SessionMetadata {
            record_type: "metadata".to_string(),
            key: session.key.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        };
        writeln!(file, "{}", serde_json::to_string(&meta)?)?;

        for turn in &session.conversation {
            writeln!(file, "{}", serde_json::to_string(turn)?)?;
        }

        debug!(
            "Saved session '{}' ({} turns) to {}",
            session.key,
            session.conversation.len(),
            path.display()
        );
        Ok(())
    }
}

/// Summary of a session for listing purposes.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    /// Session key (the cookie value).
    pub key: String,
    /// Number of stored turns.
    pub turns: usize,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
    /// Path to the JSONL file, for persistent managers.
    pub path: Option<PathBuf>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
