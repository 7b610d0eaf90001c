//! The interactive chat session.
//!
//! [`ChatSession`] bundles the index, cache, and conversation log behind one
//! explicitly-owned struct; the command interpreter and the query router are
//! the only things that mutate it. No ambient or static state.

use std::io::Write;

use anyhow::Result;

use crate::cache::DocumentCache;
use crate::command::{self, Command, LoadTarget};
use crate::config::Config;
use crate::discover;
use crate::index::DocumentIndex;
use crate::llm::LanguageModel;
use crate::models::ConversationTurn;
use crate::pointer;
use crate::repl::{LineEvent, LineReader};
use crate::router::{self, Confirm};
use crate::source::DocumentSource;
use crate::text;

pub struct ChatSession {
    config: Config,
    index: DocumentIndex,
    cache: DocumentCache,
    log: Vec<ConversationTurn>,
    source: Box<dyn DocumentSource>,
    llm: Box<dyn LanguageModel>,
    running: bool,
}

impl ChatSession {
    pub fn new(config: Config, source: Box<dyn DocumentSource>, llm: Box<dyn LanguageModel>) -> Self {
        Self {
            config,
            index: DocumentIndex::new(),
            cache: DocumentCache::new(),
            log: Vec::new(),
            source,
            llm,
            running: true,
        }
    }

    /// Discover pointer files, build the index, and generate summaries.
    ///
    /// Returns the number of indexed documents; zero means the session has
    /// nothing to talk about and should end before the query loop.
    pub async fn initialize(&mut self) -> Result<usize> {
        let refs = discover::scan_pointers(&self.config)?;
        if refs.is_empty() {
            println!(
                "No pointer files found in {}",
                self.config.docs.root.display()
            );
            return Ok(0);
        }

        println!("Building index of {} document(s)...", refs.len());
        let (count, full_texts) = self
            .index
            .build(&refs, self.source.as_ref(), self.config.chat.preview_chars)
            .await;

        if count > 0 && !full_texts.is_empty() {
            println!(
                "\nGenerating summaries for {} document(s)...",
                full_texts.len()
            );
            self.index
                .generate_summaries(
                    &full_texts,
                    self.llm.as_ref(),
                    self.config.chat.summary_input_chars,
                )
                .await;
        }

        Ok(count)
    }

    /// Run the interactive loop until `/exit`, `/quit`, or EOF.
    pub async fn run(&mut self, reader: &mut LineReader) -> Result<()> {
        let rule = "=".repeat(70);
        println!("{}", rule);
        println!("Document Chat");
        println!("{}", rule);
        println!("Directory: {}", self.config.docs.root.display());
        println!("\nBuilding document index...");

        let count = self.initialize().await?;
        if count == 0 {
            println!("\nNo documents found. Exiting.");
            return Ok(());
        }

        println!("\n{}", rule);
        println!("Ready! {} document(s) indexed.", count);
        println!("Use /help for commands. Ask overview questions anytime!");
        println!("For detailed queries, use /search and /load first.");
        println!("{}\n", rule);

        let interactive = atty::is(atty::Stream::Stdin);

        while self.running {
            if interactive {
                print!("[{}] You: ", self.cache.summary_label());
                std::io::stdout().flush()?;
            }

            match reader.next_line().await {
                LineEvent::Interrupted => {
                    println!("\n\nInterrupted. Type /exit to quit.\n");
                }
                LineEvent::Eof => {
                    println!("\nGoodbye!");
                    break;
                }
                LineEvent::Line(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.starts_with('/') {
                        match command::parse(line) {
                            Ok(cmd) => self.handle_command(cmd, reader).await?,
                            Err(e) => println!("{}", e),
                        }
                    } else {
                        self.handle_question(line, reader).await;
                    }
                }
            }
        }

        Ok(())
    }

    /// Dispatch one parsed command.
    pub async fn handle_command(
        &mut self,
        cmd: Command,
        confirm: &mut dyn Confirm,
    ) -> Result<()> {
        match cmd {
            Command::Index => self.print_index(),
            Command::Search(keywords) => self.print_search(&keywords),
            Command::Load(LoadTarget::All) => {
                let total = self.index.len();
                let warning =
                    format!("Warning: This will load {} documents. Continue?", total);
                if !confirm.confirm(&warning).await? {
                    println!("Cancelled.");
                    return Ok(());
                }
                let ordinals: Vec<usize> = (1..=total).collect();
                let loaded = self.load_ordinals(&ordinals).await;
                println!("\nLoaded {} document(s).", loaded);
            }
            Command::Load(LoadTarget::Ordinals(ordinals)) => {
                let loaded = self.load_ordinals(&ordinals).await;
                println!("\nLoaded {} document(s).", loaded);
            }
            Command::Active => self.print_active(),
            Command::Unload => {
                self.cache.clear();
                println!("Unloaded all full documents. Index remains.");
            }
            Command::History => println!("{}", router::render_log(&self.log)),
            Command::Info(ordinal) => self.print_info(ordinal),
            Command::Help => println!("{}", command::HELP_TEXT),
            Command::Exit => {
                self.running = false;
                println!("Goodbye!");
            }
        }

        Ok(())
    }

    /// Answer a free-text question through the query router.
    pub async fn handle_question(&mut self, question: &str, confirm: &mut dyn Confirm) {
        if self.index.is_empty() {
            println!("No documents indexed.");
            return;
        }

        let result = router::answer_question(
            &self.index,
            &self.cache,
            &mut self.log,
            self.llm.as_ref(),
            confirm,
            question,
            self.config.chat.history_window,
        )
        .await;

        match result {
            Ok(Some(answer)) => println!("\n{}\n", answer),
            Ok(None) => {}
            Err(e) => eprintln!("\nError: {}\n", e),
        }
    }

    /// Resolve each ordinal against the index and load it into the cache.
    ///
    /// Invalid ordinals and per-document fetch failures get a notice and are
    /// skipped; the rest of the list still loads. Returns the count of newly
    /// loaded documents.
    async fn load_ordinals(&mut self, ordinals: &[usize]) -> usize {
        let mut loaded = 0;

        for &ordinal in ordinals {
            let entry = match self.index.lookup(ordinal) {
                Some(entry) => entry,
                None => {
                    println!("  Invalid ordinal: {}", ordinal);
                    continue;
                }
            };

            print!(
                "  Loading full content: {}... ",
                text::take_chars(&entry.filename, 60)
            );
            match self.cache.load(entry, self.source.as_ref()).await {
                Ok(true) => {
                    // Just loaded; the entry is last in load order.
                    let size = self.cache.entries().last().map(|e| e.size).unwrap_or(0);
                    println!("ok ({} chars)", size);
                    loaded += 1;
                }
                Ok(false) => println!("already loaded"),
                Err(e) => println!("failed: {}", e),
            }
        }

        loaded
    }

    fn print_index(&self) {
        if self.index.is_empty() {
            println!("No documents indexed.");
            return;
        }

        println!("\nIndexed documents ({}):", self.index.len());
        for (i, entry) in self.index.entries().iter().enumerate() {
            let size_kb = entry.full_size as f64 / 1024.0;
            println!("  {}. {} ({:.1} KB)", i + 1, entry.filename, size_kb);
            if let Some(summary) = &entry.summary {
                println!("      {}", text::truncate_with_ellipsis(summary, 100));
            }
        }
    }

    fn print_search(&self, keywords: &str) {
        let results = self.index.search(keywords);
        if results.is_empty() {
            println!("No documents found matching '{}'", keywords);
            return;
        }

        println!(
            "\nFound {} document(s) matching '{}':",
            results.len(),
            keywords
        );
        for (ordinal, filename) in &results {
            println!("  {}. {}", ordinal, filename);
        }
        println!("\nUse /load <numbers> to load full content");
    }

    fn print_active(&self) {
        if self.cache.is_empty() {
            println!("No documents fully loaded.");
            return;
        }

        println!("\nFully loaded documents ({}):", self.cache.len());
        for entry in self.cache.entries() {
            let size_kb = entry.size as f64 / 1024.0;
            println!("  - {} ({:.1} KB)", entry.filename, size_kb);
        }
    }

    fn print_info(&self, ordinal: usize) {
        let entry = match self.index.lookup(ordinal) {
            Some(entry) => entry,
            None => {
                println!("Invalid ordinal: {}", ordinal);
                return;
            }
        };

        println!("\nDocument {}: {}", ordinal, entry.filename);
        println!("  id:      {}", entry.document_id);
        println!(
            "  url:     {}",
            pointer::document_url(&self.config.fetch.base_url, &entry.document_id)
        );
        println!("  pointer: {}", entry.source_path.display());
        println!("  size:    {} characters", entry.full_size);

        if let Some(cached) = self
            .cache
            .entries()
            .iter()
            .find(|e| e.filename == entry.filename)
        {
            println!(
                "  loaded:  yes ({} words, ~{} min read)",
                text::word_count(&cached.content),
                text::reading_time_minutes(&cached.content, 200)
            );
        } else {
            println!("  loaded:  no");
        }

        match &entry.summary {
            Some(summary) => println!("  summary: {}", summary),
            None => println!("  summary: (not generated)"),
        }
    }

    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn log(&self) -> &[ConversationTurn] {
        &self.log
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
