//! Core data types shared by the index, cache, and conversation flow.

use std::path::PathBuf;

/// A discovered document: the stable triple resolved from a pointer file.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    /// Pointer file name; unique key and user-facing handle.
    pub filename: String,
    /// Remote document identifier used for fetching.
    pub document_id: String,
    /// Path of the pointer file on disk.
    pub source_path: PathBuf,
}

/// Lightweight per-document record held by the index.
///
/// The full text fetched during indexing is never stored here; it is handed
/// to summary generation as a transient value and dropped afterwards. Only
/// the cache retains full text.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub filename: String,
    pub document_id: String,
    /// Leading characters of the fetched text, `...`-suffixed when truncated.
    pub preview: String,
    /// Character count of the full fetched text.
    pub full_size: usize,
    pub source_path: PathBuf,
    /// Generated summary; `None` until summary generation has run.
    pub summary: Option<String>,
}

/// Full document content held by the cache for a loaded document.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub filename: String,
    pub document_id: String,
    pub content: String,
    pub source_path: PathBuf,
    /// Character count of `content`.
    pub size: usize,
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Capitalized label used in prompts and history display.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Model => "Model",
        }
    }
}

/// One question or answer in the append-only conversation log.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}
