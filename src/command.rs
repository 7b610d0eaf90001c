//! Slash-command parsing.
//!
//! Commands are a closed vocabulary: a dedicated parser turns the input line
//! into a [`Command`] variant (or a [`CommandError`]), and the session
//! dispatches with an exhaustive match. An unrecognized `/command` is an
//! error, never a natural-language question.

use thiserror::Error;

/// A parsed slash-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/index`: show the document index.
    Index,
    /// `/search <keywords>`: search the index.
    Search(String),
    /// `/load <spec>` or `/load all`: load full content into the cache.
    Load(LoadTarget),
    /// `/active`: list loaded documents.
    Active,
    /// `/unload`: clear the cache, keeping the index.
    Unload,
    /// `/history`: show the conversation log.
    History,
    /// `/info <ordinal>`: show one document's details.
    Info(usize),
    /// `/help`: show usage.
    Help,
    /// `/exit` or `/quit`: end the session.
    Exit,
}

/// What `/load` should load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    /// Every indexed document, after confirmation.
    All,
    /// Specific ordinals, in input order, duplicates preserved.
    Ordinals(Vec<usize>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}\nType /help for available commands.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line that starts with `/`.
pub fn parse(input: &str) -> Result<Command, CommandError> {
    let mut parts = input.trim().splitn(2, char::is_whitespace);
    let keyword = parts.next().unwrap_or("").to_lowercase();
    let rest = parts.next().map(str::trim).unwrap_or("");

    match keyword.as_str() {
        "/index" => Ok(Command::Index),
        "/active" => Ok(Command::Active),
        "/unload" => Ok(Command::Unload),
        "/history" => Ok(Command::History),
        "/help" => Ok(Command::Help),
        "/exit" | "/quit" => Ok(Command::Exit),
        "/search" => {
            if rest.is_empty() {
                Err(CommandError::Usage("/search <keywords>"))
            } else {
                Ok(Command::Search(rest.to_string()))
            }
        }
        "/load" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("/load <numbers>  OR  /load all"));
            }
            if rest.eq_ignore_ascii_case("all") {
                return Ok(Command::Load(LoadTarget::All));
            }
            match parse_ordinal_spec(rest) {
                Some(ordinals) => Ok(Command::Load(LoadTarget::Ordinals(ordinals))),
                None => Err(CommandError::Usage("/load 1,3,5  or  /load 1-3")),
            }
        }
        "/info" => rest
            .parse::<usize>()
            .map(Command::Info)
            .map_err(|_| CommandError::Usage("/info <number>")),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Parse an ordinal spec like `1,3,5`, `1-3`, or `1,3-5,9`.
///
/// Any malformed segment (non-numeric token, empty segment, reversed range)
/// rejects the whole spec: partial results are never used. Input order and
/// duplicates are preserved; range bounds are inclusive.
pub fn parse_ordinal_spec(spec: &str) -> Option<Vec<usize>> {
    let mut ordinals = Vec::new();

    for segment in spec.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            return None;
        }

        if let Some((start, end)) = segment.split_once('-') {
            let start: usize = start.trim().parse().ok()?;
            let end: usize = end.trim().parse().ok()?;
            if end < start {
                return None;
            }
            ordinals.extend(start..=end);
        } else {
            ordinals.push(segment.parse().ok()?);
        }
    }

    if ordinals.is_empty() {
        None
    } else {
        Some(ordinals)
    }
}

pub const HELP_TEXT: &str = "\
Available commands:
  /index             - Show the document index
  /search <keywords> - Search for documents by keywords
  /load <numbers>    - Load full content of documents (e.g., /load 1,3,5)
  /load all          - Load all documents (warning: may be large!)
  /active            - Show which documents are fully loaded
  /unload            - Unload all full documents (keep index)
  /info <number>     - Show details for one document
  /history           - Show conversation history
  /help              - Show this help message
  /exit or /quit     - Exit the chatbot

Query modes:
  - Overview queries use the lightweight index (all docs)
  - Detailed queries use fully loaded documents
  - The bot will prompt you to load documents when needed";
