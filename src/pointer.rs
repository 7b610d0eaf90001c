//! Pointer file parsing.
//!
//! A pointer file is a small JSON document standing in for a remote document.
//! It carries either an explicit `doc_id` or a `url` from which the id can be
//! extracted (`.../d/<id>/...`). Only the id is needed here; everything else
//! in the file is metadata we ignore.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PointerFile {
    #[serde(default)]
    doc_id: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Extract the document id from pointer file content.
pub fn parse_pointer(content: &str) -> Result<String> {
    let pointer: PointerFile =
        serde_json::from_str(content.trim()).context("pointer file is not valid JSON")?;

    if let Some(id) = pointer.doc_id {
        if !id.trim().is_empty() {
            return Ok(id);
        }
    }

    if let Some(url) = pointer.url.as_deref() {
        if let Some(id) = id_from_url(url) {
            return Ok(id.to_string());
        }
    }

    bail!("pointer file has no document id (expected 'doc_id' or a 'url' containing /d/<id>/)")
}

/// Read and parse a pointer file from disk.
pub fn parse_pointer_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pointer file: {}", path.display()))?;
    parse_pointer(&content)
}

/// Browser URL for a document id.
pub fn document_url(base_url: &str, document_id: &str) -> String {
    format!(
        "{}/document/d/{}/edit",
        base_url.trim_end_matches('/'),
        document_id
    )
}

fn id_from_url(url: &str) -> Option<&str> {
    let rest = url.split("/d/").nth(1)?;
    let id = rest.split('/').next().unwrap_or(rest);
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
