//! The lightweight document index.
//!
//! One [`IndexEntry`] per discovered document: a preview, the full size, and
//! a generated summary. The index is the cheap tier; it can describe every
//! document in the collection without holding any full text. Ordinals are
//! 1-based insertion positions and never change for the life of a session.

use std::collections::HashMap;

use crate::llm::LanguageModel;
use crate::models::{DocumentRef, IndexEntry};
use crate::source::DocumentSource;
use crate::text;

/// Stored in place of a summary when generation fails for one document.
pub const SUMMARY_SENTINEL: &str = "[Summary generation failed]";

const SUMMARY_TEMPERATURE: f32 = 0.3;
const SNIPPET_CHARS: usize = 200;

/// Lightweight index of all documents for fast overview queries.
#[derive(Default)]
pub struct DocumentIndex {
    entries: Vec<IndexEntry>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build index entries for every discovered document.
    ///
    /// Fetches are strictly sequential. A per-document fetch failure is
    /// reported and skipped; it does not abort the remaining documents.
    /// Already-indexed filenames are left untouched and counted as success,
    /// so ordinals assigned earlier never shift.
    ///
    /// Returns the count of successfully indexed documents together with the
    /// fetched full texts, keyed by filename. The texts exist only to feed
    /// [`generate_summaries`](Self::generate_summaries); they are not stored
    /// on the entries.
    pub async fn build(
        &mut self,
        refs: &[DocumentRef],
        source: &dyn DocumentSource,
        preview_chars: usize,
    ) -> (usize, HashMap<String, String>) {
        let mut success_count = 0;
        let mut full_texts = HashMap::new();

        for doc_ref in refs {
            if self.contains(&doc_ref.filename) {
                success_count += 1;
                continue;
            }

            print!("  Indexing {}... ", text::take_chars(&doc_ref.filename, 60));

            match source.fetch(&doc_ref.document_id).await {
                Ok(content) => {
                    let full_size = content.chars().count();
                    println!("ok ({} chars)", full_size);

                    self.entries.push(IndexEntry {
                        filename: doc_ref.filename.clone(),
                        document_id: doc_ref.document_id.clone(),
                        preview: text::truncate_with_ellipsis(&content, preview_chars),
                        full_size,
                        source_path: doc_ref.source_path.clone(),
                        summary: None,
                    });
                    full_texts.insert(doc_ref.filename.clone(), content);
                    success_count += 1;
                }
                Err(e) => {
                    println!("failed: {}", e);
                }
            }
        }

        (success_count, full_texts)
    }

    /// Generate a summary for every entry that lacks one.
    ///
    /// Submits the first `summary_input_chars` characters of each entry's
    /// transient full text at low temperature. A per-document failure stores
    /// [`SUMMARY_SENTINEL`] instead of aborting the batch. Entries whose text
    /// is missing from `full_texts` are left unsummarized.
    pub async fn generate_summaries(
        &mut self,
        full_texts: &HashMap<String, String>,
        llm: &dyn LanguageModel,
        summary_input_chars: usize,
    ) {
        let total = self.entries.len();

        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.summary.is_some() {
                continue;
            }
            let content = match full_texts.get(&entry.filename) {
                Some(content) => content,
                None => continue,
            };

            print!(
                "  [{}/{}] Summarizing {}... ",
                i + 1,
                total,
                text::take_chars(&entry.filename, 50)
            );

            let prompt = summary_prompt(content, summary_input_chars);
            match llm.generate(&prompt, SUMMARY_TEMPERATURE).await {
                Ok(summary) => {
                    entry.summary = Some(summary.trim().to_string());
                    println!("ok");
                }
                Err(e) => {
                    entry.summary = Some(SUMMARY_SENTINEL.to_string());
                    println!("failed: {}", e);
                }
            }
        }
    }

    /// Case-insensitive substring search over filename and summary.
    ///
    /// Returns `(ordinal, filename)` pairs in index order.
    pub fn search(&self, keywords: &str) -> Vec<(usize, String)> {
        let needle = keywords.to_lowercase();

        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let haystack = format!(
                    "{} {}",
                    entry.filename,
                    entry.summary.as_deref().unwrap_or("")
                )
                .to_lowercase();
                if haystack.contains(&needle) {
                    Some((i + 1, entry.filename.clone()))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Entry at the 1-based ordinal, or `None` when out of range.
    pub fn lookup(&self, ordinal: usize) -> Option<&IndexEntry> {
        if ordinal == 0 {
            return None;
        }
        self.entries.get(ordinal - 1)
    }

    /// Render the whole index as language-model context for overview queries.
    pub fn overview_context(&self) -> String {
        if self.entries.is_empty() {
            return "No documents indexed.".to_string();
        }

        let mut lines = vec!["=== DOCUMENT INDEX ===".to_string(), String::new()];
        for (i, entry) in self.entries.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, entry.filename));
            lines.push(format!("   Size: {} characters", entry.full_size));
            if let Some(summary) = &entry.summary {
                lines.push(format!("   Summary: {}", summary));
            }
            lines.push(format!(
                "   Preview: {}...",
                text::take_chars(&entry.preview, SNIPPET_CHARS)
            ));
            lines.push(String::new());
        }

        lines.join("\n")
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.iter().any(|e| e.filename == filename)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn summary_prompt(content: &str, summary_input_chars: usize) -> String {
    format!(
        "Provide a concise 2-3 sentence summary of this document's main topic and purpose:\n\n\
         {}\n\n\
         Summary:",
        text::take_chars(content, summary_input_chars)
    )
}
