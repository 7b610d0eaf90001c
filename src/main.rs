use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use doc_chat::config::{self, Config};
use doc_chat::llm::GeminiBackend;
use doc_chat::repl::LineReader;
use doc_chat::session::ChatSession;
use doc_chat::source::ExportSource;

/// Chat with a directory of remote-document pointer files.
#[derive(Parser, Debug)]
#[command(name = "dchat", version, about)]
struct Cli {
    /// Directory to scan for pointer files (overrides the config value).
    directory: Option<PathBuf>,

    /// Path to the configuration file.
    #[arg(long, default_value = "./config/dchat.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        Config::default()
    };

    if let Some(directory) = cli.directory {
        config.docs.root = directory;
    }

    if !config.docs.root.is_dir() {
        anyhow::bail!(
            "Document directory not found: {}",
            config.docs.root.display()
        );
    }

    let source = ExportSource::new(&config.fetch).context("Failed to build document fetcher")?;
    let llm = GeminiBackend::new(&config.llm).context("Failed to build language model backend")?;

    let mut reader = LineReader::spawn();
    let mut session = ChatSession::new(config, Box::new(source), Box::new(llm));
    session.run(&mut reader).await
}
