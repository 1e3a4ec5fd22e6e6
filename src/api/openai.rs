//! OpenAI chat-completions client for the strategy advisory feature.

use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::CalcError;

use super::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};

const OPENAI_API_BASE: &str = "https://api.openai.com";
const MODEL: &str = "gpt-4o-mini";
const MAX_COMPLETION_TOKENS: u32 = 400;
const TEMPERATURE: f64 = 0.7;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable carrying the API credential.
pub const OPENAI_KEY_VAR: &str = "OPENAI_KEY";

/// Client for a single blocking-style completion request. The credential is
/// passed through as-is; no further auth scheme exists.
pub struct AdvisorClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AdvisorClient {
    /// Build a client from the `OPENAI_KEY` environment variable.
    pub fn from_env() -> Result<Self, CalcError> {
        let api_key = std::env::var(OPENAI_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                CalcError::AdvisoryUnavailable(format!(
                    "{OPENAI_KEY_VAR} not set; add it to your environment or .env file"
                ))
            })?;

        Self::with_base_url(api_key, OPENAI_API_BASE.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, CalcError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| {
                CalcError::AdvisoryUnavailable(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Send a prompt and return the raw completion text.
    pub async fn request_completion(&self, prompt: &str) -> Result<String, CalcError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        debug!(model = MODEL, prompt_len = prompt.len(), "Requesting completion");

        let body = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_completion_tokens: MAX_COMPLETION_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CalcError::AdvisoryUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Prefer the API's own error message when the envelope parses.
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            return Err(CalcError::AdvisoryUnavailable(format!(
                "{status} - {message}"
            )));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            CalcError::AdvisoryUnavailable(format!("failed to parse completion response: {e}"))
        })?;

        let text = completion
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| {
                CalcError::AdvisoryUnavailable("completion response had no choices".to_string())
            })?;

        Ok(text)
    }
}
