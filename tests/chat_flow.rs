//! End-to-end session flows over a temporary pointer directory, with
//! scripted source/model/confirmation doubles in place of the network.

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use doc_chat::command::{self, Command};
use doc_chat::config::Config;
use doc_chat::llm::{GenerationError, LanguageModel};
use doc_chat::router::Confirm;
use doc_chat::session::ChatSession;
use doc_chat::source::{DocumentSource, FetchError};

/// Serves canned text by document id and counts fetches per id.
#[derive(Clone)]
struct SharedSource {
    texts: HashMap<String, String>,
    fetches: Arc<Mutex<HashMap<String, usize>>>,
}

impl SharedSource {
    fn new(texts: &[(&str, &str)]) -> Self {
        Self {
            texts: texts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fetches: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn fetch_count(&self, id: &str) -> usize {
        *self.fetches.lock().unwrap().get(id).unwrap_or(&0)
    }
}

#[async_trait]
impl DocumentSource for SharedSource {
    async fn fetch(&self, document_id: &str) -> Result<String, FetchError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(document_id.to_string())
            .or_insert(0) += 1;
        self.texts
            .get(document_id)
            .cloned()
            .ok_or(FetchError::Http {
                status: 404,
                body: "not found".to_string(),
            })
    }
}

/// Replies with a fixed answer and records every prompt it receives.
#[derive(Clone)]
struct SharedModel {
    prompts: Arc<Mutex<Vec<String>>>,
    reply: String,
    fail: bool,
}

impl SharedModel {
    fn replying(reply: &str) -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            reply: reply.to_string(),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            reply: String::new(),
            fail: true,
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for SharedModel {
    async fn generate(&self, prompt: &str, _temperature: f32) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            Err(GenerationError::EmptyResponse)
        } else {
            Ok(self.reply.clone())
        }
    }
}

struct ScriptedConfirm {
    answer: bool,
    asked: usize,
}

impl ScriptedConfirm {
    fn yes() -> Self {
        Self {
            answer: true,
            asked: 0,
        }
    }

    fn no() -> Self {
        Self {
            answer: false,
            asked: 0,
        }
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        self.asked += 1;
        Ok(self.answer)
    }
}

/// Three pointer files whose sorted order is budget, hiring, roadmap.
fn write_pointers(dir: &TempDir) {
    fs::write(dir.path().join("budget.gdoc"), r#"{"doc_id": "id-budget"}"#).unwrap();
    fs::write(dir.path().join("hiring.gdoc"), r#"{"doc_id": "id-hiring"}"#).unwrap();
    fs::write(
        dir.path().join("roadmap.gdoc"),
        r#"{"url": "https://docs.google.com/document/d/id-roadmap/edit"}"#,
    )
    .unwrap();
}

fn standard_source() -> SharedSource {
    SharedSource::new(&[
        ("id-budget", "Budget figures for the year."),
        ("id-hiring", "Hiring plan and headcount."),
        ("id-roadmap", "Roadmap milestones for the platform."),
    ])
}

async fn started_session(
    dir: &TempDir,
    source: &SharedSource,
    model: &SharedModel,
) -> ChatSession {
    let mut config = Config::default();
    config.docs.root = dir.path().to_path_buf();

    let mut session = ChatSession::new(config, Box::new(source.clone()), Box::new(model.clone()));
    session.initialize().await.unwrap();
    session
}

async fn run_command(session: &mut ChatSession, line: &str, confirm: &mut ScriptedConfirm) {
    let cmd: Command = command::parse(line).unwrap();
    session.handle_command(cmd, confirm).await.unwrap();
}

#[tokio::test]
async fn initialize_indexes_and_summarizes_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("A short summary.");

    let session = started_session(&dir, &source, &model).await;

    let names: Vec<&str> = session
        .index()
        .entries()
        .iter()
        .map(|e| e.filename.as_str())
        .collect();
    assert_eq!(names, vec!["budget.gdoc", "hiring.gdoc", "roadmap.gdoc"]);

    // Pointer id extracted from the url form as well
    assert_eq!(session.index().entries()[2].document_id, "id-roadmap");

    for entry in session.index().entries() {
        assert_eq!(entry.summary.as_deref(), Some("A short summary."));
    }

    // One fetch per document during indexing, nothing cached yet
    assert_eq!(source.fetch_count("id-budget"), 1);
    assert!(session.cache().is_empty());
}

#[tokio::test]
async fn fetch_failure_during_indexing_skips_that_document() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    // No text registered for the hiring doc
    let source = SharedSource::new(&[
        ("id-budget", "Budget figures for the year."),
        ("id-roadmap", "Roadmap milestones for the platform."),
    ]);
    let model = SharedModel::replying("A short summary.");

    let mut config = Config::default();
    config.docs.root = dir.path().to_path_buf();
    let mut session = ChatSession::new(config, Box::new(source.clone()), Box::new(model.clone()));

    let count = session.initialize().await.unwrap();
    assert_eq!(count, 2);
    assert!(!session.index().contains("hiring.gdoc"));
    assert_eq!(session.index().lookup(2).unwrap().filename, "roadmap.gdoc");
}

#[tokio::test]
async fn load_command_caches_selected_ordinals_once() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("A short summary.");
    let mut session = started_session(&dir, &source, &model).await;
    let mut confirm = ScriptedConfirm::no();

    run_command(&mut session, "/load 1,3", &mut confirm).await;

    let loaded: Vec<&str> = session
        .cache()
        .entries()
        .iter()
        .map(|e| e.filename.as_str())
        .collect();
    assert_eq!(loaded, vec!["budget.gdoc", "roadmap.gdoc"]);

    // Indexing fetched once, loading fetched once more
    assert_eq!(source.fetch_count("id-budget"), 2);
    assert_eq!(source.fetch_count("id-hiring"), 1);

    // Reloading an already-cached ordinal does not fetch again
    run_command(&mut session, "/load 1", &mut confirm).await;
    assert_eq!(source.fetch_count("id-budget"), 2);
    assert_eq!(session.cache().len(), 2);
}

#[tokio::test]
async fn out_of_range_ordinal_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("A short summary.");
    let mut session = started_session(&dir, &source, &model).await;
    let mut confirm = ScriptedConfirm::no();

    run_command(&mut session, "/load 99", &mut confirm).await;
    assert!(session.cache().is_empty());
}

#[tokio::test]
async fn load_all_asks_first_and_respects_decline() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("A short summary.");
    let mut session = started_session(&dir, &source, &model).await;

    let mut decline = ScriptedConfirm::no();
    run_command(&mut session, "/load all", &mut decline).await;
    assert_eq!(decline.asked, 1);
    assert!(session.cache().is_empty());

    let mut accept = ScriptedConfirm::yes();
    run_command(&mut session, "/load all", &mut accept).await;
    assert_eq!(session.cache().len(), 3);
}

#[tokio::test]
async fn question_with_loaded_docs_sees_only_cached_content() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("Here is the answer.");
    let mut session = started_session(&dir, &source, &model).await;
    let mut confirm = ScriptedConfirm::no();

    run_command(&mut session, "/load 1,3", &mut confirm).await;
    session
        .handle_question("summarize the exact budget figures", &mut confirm)
        .await;

    // Deep question with a loaded cache never asks for confirmation
    assert_eq!(confirm.asked, 0);

    let prompts = model.prompts();
    let question_prompt = prompts.last().unwrap();
    assert!(question_prompt.contains("FULLY LOADED DOCUMENTS:"));
    assert!(question_prompt.contains("=== budget.gdoc ==="));
    assert!(question_prompt.contains("Budget figures for the year."));
    assert!(question_prompt.contains("Roadmap milestones"));
    assert!(!question_prompt.contains("Hiring plan and headcount."));

    assert_eq!(session.log().len(), 2);
    assert_eq!(session.log()[1].text, "Here is the answer.");
}

#[tokio::test]
async fn overview_question_with_empty_cache_uses_index_without_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("Three documents about planning.");
    let mut session = started_session(&dir, &source, &model).await;
    let mut confirm = ScriptedConfirm::no();

    session
        .handle_question("what topics do these cover?", &mut confirm)
        .await;

    assert_eq!(confirm.asked, 0);
    let prompts = model.prompts();
    let question_prompt = prompts.last().unwrap();
    assert!(question_prompt.contains("DOCUMENT INDEX:"));
    assert!(question_prompt.contains("budget.gdoc"));
}

#[tokio::test]
async fn declined_deep_question_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("A short summary.");
    let mut session = started_session(&dir, &source, &model).await;
    let summary_calls = model.prompts().len();

    let mut confirm = ScriptedConfirm::no();
    session
        .handle_question("explain the third milestone in detail", &mut confirm)
        .await;

    assert_eq!(confirm.asked, 1);
    assert_eq!(model.prompts().len(), summary_calls);
    assert!(session.log().is_empty());
}

#[tokio::test]
async fn unload_clears_cache_but_keeps_index_and_summaries() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("A short summary.");
    let mut session = started_session(&dir, &source, &model).await;
    let mut confirm = ScriptedConfirm::yes();

    run_command(&mut session, "/load all", &mut confirm).await;
    assert_eq!(session.cache().len(), 3);

    run_command(&mut session, "/unload", &mut confirm).await;
    assert!(session.cache().is_empty());
    assert_eq!(session.index().len(), 3);
    for entry in session.index().entries() {
        assert_eq!(entry.summary.as_deref(), Some("A short summary."));
    }
}

#[tokio::test]
async fn failed_answer_leaves_conversation_log_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::failing();

    let mut config = Config::default();
    config.docs.root = dir.path().to_path_buf();
    let mut session = ChatSession::new(config, Box::new(source.clone()), Box::new(model.clone()));
    session.initialize().await.unwrap();

    // Summaries failed, so every entry carries the sentinel
    for entry in session.index().entries() {
        assert_eq!(
            entry.summary.as_deref(),
            Some("[Summary generation failed]")
        );
    }

    let mut confirm = ScriptedConfirm::no();
    session
        .handle_question("what topics do these cover?", &mut confirm)
        .await;
    assert!(session.log().is_empty());
}

#[tokio::test]
async fn exit_command_stops_the_session() {
    let dir = tempfile::tempdir().unwrap();
    write_pointers(&dir);
    let source = standard_source();
    let model = SharedModel::replying("A short summary.");
    let mut session = started_session(&dir, &source, &model).await;
    let mut confirm = ScriptedConfirm::no();

    assert!(session.is_running());
    run_command(&mut session, "/exit", &mut confirm).await;
    assert!(!session.is_running());
}
