//! The full-content cache.
//!
//! Holds complete text for a user-selected subset of indexed documents.
//! This is the expensive tier: entries are loaded on demand, one fetch per
//! document, and only ever dropped in bulk by [`DocumentCache::clear`].

use crate::models::{CacheEntry, IndexEntry};
use crate::source::{DocumentSource, FetchError};

/// Returned by [`DocumentCache::full_context`] when nothing is loaded.
pub const EMPTY_CACHE_SENTINEL: &str = "[No documents fully loaded]";

/// Full content cache for deep queries (selective loading).
#[derive(Default)]
pub struct DocumentCache {
    entries: Vec<CacheEntry>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the full content for an indexed document.
    ///
    /// Idempotent: returns `Ok(false)` without fetching when the filename is
    /// already cached, `Ok(true)` after a fresh load. A fetch failure is
    /// returned for the caller to report; the cache is left unchanged.
    pub async fn load(
        &mut self,
        entry: &IndexEntry,
        source: &dyn DocumentSource,
    ) -> Result<bool, FetchError> {
        if self.contains(&entry.filename) {
            return Ok(false);
        }

        let content = source.fetch(&entry.document_id).await?;
        let size = content.chars().count();

        self.entries.push(CacheEntry {
            filename: entry.filename.clone(),
            document_id: entry.document_id.clone(),
            content,
            source_path: entry.source_path.clone(),
            size,
        });

        Ok(true)
    }

    /// Render every cached document, in load order, as model context.
    pub fn full_context(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_CACHE_SENTINEL.to_string();
        }

        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("=== {} ===\n{}\n", e.filename, e.content))
            .collect();

        parts.join("\n")
    }

    /// Drop every cached entry. The index is untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Short status label for the interactive prompt.
    pub fn summary_label(&self) -> String {
        if self.entries.is_empty() {
            "none loaded".to_string()
        } else {
            format!("{} loaded", self.entries.len())
        }
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.iter().any(|e| e.filename == filename)
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
