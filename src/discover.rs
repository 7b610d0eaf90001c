//! Document discovery: scan the configured root for pointer files.
//!
//! Enumeration order is deterministic (sorted by filename), so ordinals
//! assigned during index build are stable across sessions over the same
//! directory. A pointer that fails to parse is reported and skipped; it does
//! not abort discovery.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::Config;
use crate::models::DocumentRef;
use crate::pointer;

pub fn scan_pointers(config: &Config) -> Result<Vec<DocumentRef>> {
    let root = &config.docs.root;
    if !root.exists() {
        bail!("document directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.docs.include_globs)?;
    let exclude_set = build_globset(&config.docs.exclude_globs)?;

    let mut refs = Vec::new();

    for entry in walkdir::WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let filename = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => continue,
        };

        match pointer::parse_pointer_file(path) {
            Ok(document_id) => refs.push(DocumentRef {
                filename,
                document_id,
                source_path: path.to_path_buf(),
            }),
            Err(e) => {
                eprintln!("Skipping {}: {}", rel_str, e);
            }
        }
    }

    // Sort for deterministic ordinal assignment
    refs.sort_by(|a, b| a.filename.cmp(&b.filename));

    Ok(refs)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
