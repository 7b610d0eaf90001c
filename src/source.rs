//! Document source abstraction and the HTTP export implementation.
//!
//! The rest of the system treats a [`DocumentSource`] as a black box that
//! turns a document id into text. [`ExportSource`] is the production
//! implementation: it fetches plain text from the document service's export
//! endpoint with bounded retry.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::FetchConfig;

/// Failure fetching a document's text.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("document service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("fetch failed after retries: {0}")]
    RetriesExhausted(String),
}

/// Fetches full document text by id.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, document_id: &str) -> Result<String, FetchError>;
}

/// Document source backed by the document service's export endpoint.
///
/// Requests `GET {base_url}/document/d/{id}/export?format={format}` and
/// returns the response body as text.
pub struct ExportSource {
    client: reqwest::Client,
    base_url: String,
    format: String,
    max_retries: u32,
}

impl ExportSource {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            format: config.format.clone(),
            max_retries: config.max_retries,
        })
    }

    fn export_url(&self, document_id: &str) -> String {
        format!(
            "{}/document/d/{}/export?format={}",
            self.base_url, document_id, self.format
        )
    }
}

#[async_trait]
impl DocumentSource for ExportSource {
    async fn fetch(&self, document_id: &str) -> Result<String, FetchError> {
        let url = self.export_url(document_id);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            match self.client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response
                            .text()
                            .await
                            .map_err(|e| FetchError::Network(e.to_string()));
                    }

                    let body = response.text().await.unwrap_or_default();

                    // Rate limited or server error, retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(FetchError::Http {
                            status: status.as_u16(),
                            body,
                        });
                        continue;
                    }

                    // Client error (not 429), fail fast
                    return Err(FetchError::Http {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) => {
                    last_err = Some(FetchError::Network(e.to_string()));
                    continue;
                }
            }
        }

        Err(match last_err {
            Some(e) => FetchError::RetriesExhausted(e.to_string()),
            None => FetchError::RetriesExhausted("no attempts made".to_string()),
        })
    }
}
