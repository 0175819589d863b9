//! Session store: in-memory cache + optional JSONL file persistence.
//!
//! # Disk format (JSONL)
//!
//! Each session is a `.jsonl` file under the configured sessions directory.
//! - Line 1: metadata `{"_type": "metadata", "key": "...", "created_at": "...", "updated_at": "..."}`
//! - Lines 2+: turns `{"role": "user", "text": "hello"}`

pub mod manager;

pub use manager::{SessionManager, SessionSummary};
