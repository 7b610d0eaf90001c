use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Where pointer files live and which ones to pick up.
#[derive(Debug, Deserialize, Clone)]
pub struct DocsConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.gdoc".to_string()]
}

/// Document service export endpoint settings.
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_base_url")]
    pub base_url: String,
    /// Export format requested from the document service.
    #[serde(default = "default_fetch_format")]
    pub format: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_fetch_base_url(),
            format: default_fetch_format(),
            timeout_secs: default_fetch_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_fetch_base_url() -> String {
    "https://docs.google.com".to_string()
}
fn default_fetch_format() -> String {
    "txt".to_string()
}
fn default_fetch_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

/// Language model backend settings.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_llm_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    60
}

/// Index and prompt-assembly sizing.
#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Characters of each document kept as the index preview.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Characters of each document fed to summary generation.
    #[serde(default = "default_summary_input_chars")]
    pub summary_input_chars: usize,
    /// Number of recent conversation turns rendered into prompts.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            summary_input_chars: default_summary_input_chars(),
            history_window: default_history_window(),
        }
    }
}

fn default_preview_chars() -> usize {
    1000
}
fn default_summary_input_chars() -> usize {
    5000
}
fn default_history_window() -> usize {
    4
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.docs.include_globs.is_empty() {
        anyhow::bail!("docs.include_globs must not be empty");
    }

    match config.fetch.format.as_str() {
        "txt" | "html" => {}
        other => anyhow::bail!("Unknown fetch.format: '{}'. Must be txt or html.", other),
    }

    if config.llm.model.trim().is_empty() {
        anyhow::bail!("llm.model must not be empty");
    }

    if config.chat.preview_chars == 0 {
        anyhow::bail!("chat.preview_chars must be > 0");
    }
    if config.chat.history_window == 0 {
        anyhow::bail!("chat.history_window must be > 0");
    }

    Ok(())
}
