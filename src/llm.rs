//! Language model backend abstraction and the Gemini implementation.
//!
//! The core only needs [`LanguageModel::generate`]: prompt and temperature
//! in, plain text out. No streaming. [`GeminiBackend`] calls the Gemini
//! `generateContent` REST API with the same retry/backoff policy as the
//! document source.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::LlmConfig;

/// Failure generating text from the backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("generation failed after retries: {0}")]
    RetriesExhausted(String),
}

/// Generates text from a prompt at a given sampling temperature.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError>;
}

/// Language model backend using the Gemini REST API.
///
/// Calls `POST {base_url}/v1beta/models/{model}:generateContent` with the
/// API key read from the environment variable named in config.
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_retries: u32,
}

impl GeminiBackend {
    /// Create a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured API key environment variable is
    /// not set, so a session fails up front rather than on the first call.
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            anyhow::anyhow!("{} environment variable not set", config.api_key_env)
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            max_retries: config.max_retries,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiBackend {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": temperature },
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| GenerationError::Network(e.to_string()))?;
                        return parse_generate_response(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();

                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(GenerationError::Http {
                            status: status.as_u16(),
                            body: body_text,
                        });
                        continue;
                    }

                    return Err(GenerationError::Http {
                        status: status.as_u16(),
                        body: body_text,
                    });
                }
                Err(e) => {
                    last_err = Some(GenerationError::Network(e.to_string()));
                    continue;
                }
            }
        }

        Err(match last_err {
            Some(e) => GenerationError::RetriesExhausted(e.to_string()),
            None => GenerationError::RetriesExhausted("no attempts made".to_string()),
        })
    }
}

/// Extract the generated text from a `generateContent` response.
///
/// Concatenates all text parts of the first candidate.
fn parse_generate_response(json: &serde_json::Value) -> Result<String, GenerationError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or(GenerationError::EmptyResponse)?;

    let mut text = String::new();
    for part in parts {
        if let Some(t) = part.get("text").and_then(|t| t.as_str()) {
            text.push_str(t);
        }
    }

    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(text)
}
