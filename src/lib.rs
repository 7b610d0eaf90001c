//! Conversational CLI over a directory of remote-document pointer files.
//!
//! Pointer files on disk name documents that live in a remote service. The
//! chatbot builds a lightweight index of every document (preview, summary,
//! size), lets the user selectively load full content into a cache, and
//! routes each question to whichever tier can answer it.
//!
//! Module map:
//! - [`config`]: TOML configuration with defaults and validation
//! - [`models`]: core data types shared across tiers
//! - [`pointer`]: pointer-file parsing and document URLs
//! - [`discover`]: filesystem scan for pointer files
//! - [`source`]: remote document fetching with retry
//! - [`llm`]: language model backend
//! - [`text`]: char-based truncation and counting helpers
//! - [`index`]: the lightweight per-document index
//! - [`cache`]: the full-content cache
//! - [`router`]: context-mode selection and prompt assembly
//! - [`command`]: slash-command parsing
//! - [`repl`]: stdin line events and interactive confirmation
//! - [`session`]: the interactive chat session

pub mod cache;
pub mod command;
pub mod config;
pub mod discover;
pub mod index;
pub mod llm;
pub mod models;
pub mod pointer;
pub mod repl;
pub mod router;
pub mod session;
pub mod source;
pub mod text;
