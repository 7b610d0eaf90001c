//! Context building and query routing.
//!
//! Every question is answered in exactly one of three context modes, chosen
//! fresh per question and never persisted:
//!
//! 1. **Full content**: the cache is non-empty; its documents are the
//!    context, regardless of how the question is phrased.
//! 2. **Overview**: the cache is empty and the question reads like an
//!    overview query; the index rendering is the context.
//! 3. **Confirm then overview**: the cache is empty and the question looks
//!    deep; the user must confirm falling back to the index, and declining
//!    aborts with no model call and no conversation-log mutation.

use anyhow::Result;
use async_trait::async_trait;

use crate::cache::DocumentCache;
use crate::index::DocumentIndex;
use crate::llm::LanguageModel;
use crate::models::ConversationTurn;
use crate::text;

/// Questions containing any of these (case-insensitive) are answerable from
/// the index alone. A fixed list, kept as observed behavior; making it
/// configurable is an open question.
pub const OVERVIEW_KEYWORDS: [&str; 8] = [
    "which",
    "what",
    "how many",
    "list",
    "organize",
    "categorize",
    "topics",
    "all",
];

const ANSWER_TEMPERATURE: f32 = 0.7;

const FULL_CONTEXT_LABEL: &str = "FULLY LOADED DOCUMENTS";
const INDEX_CONTEXT_LABEL: &str = "DOCUMENT INDEX";

/// Which tier of data a question will see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    FullContent,
    Overview,
    ConfirmOverview,
}

/// Select the context mode for one question.
pub fn select_mode(question: &str, cache_is_empty: bool) -> ContextMode {
    if !cache_is_empty {
        return ContextMode::FullContent;
    }

    let lowered = question.to_lowercase();
    if OVERVIEW_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        ContextMode::Overview
    } else {
        ContextMode::ConfirmOverview
    }
}

/// Injectable yes/no confirmation, so routing is testable without a terminal.
#[async_trait]
pub trait Confirm: Send {
    async fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Render the most recent `window` turns as a `Role: text` block.
fn render_history(log: &[ConversationTurn], window: usize) -> String {
    let start = log.len().saturating_sub(window);
    log[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the final prompt sent to the language model.
///
/// The history section is present only when the log is non-empty.
pub fn build_prompt(
    log: &[ConversationTurn],
    window: usize,
    context_label: &str,
    context: &str,
    question: &str,
) -> String {
    let framing = "You are a helpful assistant answering questions about documents.";

    if log.is_empty() {
        format!(
            "{}\n\n{}:\n{}\n\nUser question: {}\n\nAnswer:",
            framing, context_label, context, question
        )
    } else {
        format!(
            "{}\n\nPrevious conversation:\n{}\n\n{}:\n{}\n\nUser question: {}\n\nAnswer:",
            framing,
            render_history(log, window),
            context_label,
            context,
            question
        )
    }
}

/// Answer one question against the appropriate context tier.
///
/// Returns `Ok(None)` when the user declines the confirm-then-overview
/// fallback (nothing sent, log untouched). On backend failure the error
/// propagates and the log is left unmodified; both turns are appended only
/// after a successful generation.
pub async fn answer_question(
    index: &DocumentIndex,
    cache: &DocumentCache,
    log: &mut Vec<ConversationTurn>,
    llm: &dyn LanguageModel,
    confirm: &mut dyn Confirm,
    question: &str,
    history_window: usize,
) -> Result<Option<String>> {
    let (context_label, context) = match select_mode(question, cache.is_empty()) {
        ContextMode::FullContent => (FULL_CONTEXT_LABEL, cache.full_context()),
        ContextMode::Overview => (INDEX_CONTEXT_LABEL, index.overview_context()),
        ContextMode::ConfirmOverview => {
            println!("\nThis seems like a detailed question, but no documents are fully loaded.");
            println!("Tip: Use /search to find relevant documents, then /load to load them.");
            println!("Or I can try to answer using the document index (less detailed).");

            if !confirm.confirm("\nProceed with index?").await? {
                println!("Cancelled. Use /search and /load to load specific documents.");
                return Ok(None);
            }

            (INDEX_CONTEXT_LABEL, index.overview_context())
        }
    };

    let prompt = build_prompt(log, history_window, context_label, &context, question);

    println!("Thinking...");
    let answer = llm.generate(&prompt, ANSWER_TEMPERATURE).await?;

    log.push(ConversationTurn::user(question));
    log.push(ConversationTurn::model(answer.clone()));

    Ok(Some(answer))
}

/// Render the conversation log for the `/history` command.
pub fn render_log(log: &[ConversationTurn]) -> String {
    if log.is_empty() {
        return "No conversation history.".to_string();
    }

    let mut lines = vec!["Conversation history:".to_string()];
    for (i, turn) in log.iter().enumerate() {
        lines.push(format!(
            "  {}. [{}] {}",
            i + 1,
            turn.role.label(),
            text::truncate_with_ellipsis(&turn.text, 100)
        ));
    }
    lines.join("\n")
}
