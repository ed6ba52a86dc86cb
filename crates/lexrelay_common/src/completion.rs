//! Upstream completion client abstraction.
//!
//! Provides a generic interface for sending an assembled prompt to the
//! text-completion API. Supports the real HTTP implementation and a fake
//! client for testing.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Completion errors. All of these surface to the browser client as one
/// generic unavailability message; the detail is for server-side logs only.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    #[error("upstream API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("invalid JSON response: {0}")]
    InvalidJson(String),
}

/// Generic completion client trait.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the model's answer text.
    ///
    /// A structurally empty response body (no candidates, no parts) is an
    /// empty answer, not an error.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Real completion client speaking the `contents`/`parts` wire format.
pub struct HttpCompletionClient {
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpCompletionClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            timeout_secs,
            client,
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        // Missing key is a configuration error; short-circuit before any I/O.
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        tracing::debug!("[C]  Dispatching prompt ({} chars) upstream", prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(self.timeout_secs)
                } else {
                    CompletionError::Http(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(CompletionError::Http(format!(
                "HTTP {} from upstream",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidJson(format!("failed to parse response: {}", e)))?;

        Ok(first_candidate_text(&json))
    }
}

/// Extract the first candidate's first text part, or empty when absent.
pub fn first_candidate_text(json: &serde_json::Value) -> String {
    json.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .to_string()
}

/// Fake completion client for testing.
///
/// Returns scripted responses in order (repeating the last one) and records
/// every prompt it was asked to complete.
pub struct FakeCompletionClient {
    responses: std::sync::Mutex<Vec<Result<String, CompletionError>>>,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl FakeCompletionClient {
    /// Create a fake client with pre-defined responses.
    pub fn new(responses: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a fake client that always returns the same answer.
    pub fn always(answer: impl Into<String>) -> Self {
        Self::new(vec![Ok(answer.into())])
    }

    /// Create a fake client that always returns an error.
    pub fn always_error(error: CompletionError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(CompletionError::Http("fake client exhausted".to_string()));
        }

        if responses.len() == 1 {
            // Keep returning the same response
            responses[0].clone()
        } else {
            responses.remove(0)
        }
    }
}
