//! Chat-completion client for the language model.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::NARRATIVE_MAX_TOKENS;
use crate::error_handling::{categorize_reqwest_error, UpstreamError};
use crate::utils::with_retry;

pub(crate) const SERVICE: &str = "narrative model";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

/// Minimal client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Without an API key every call fails with `UpstreamError::NotConfigured`
/// and no request is sent.
#[derive(Clone)]
pub struct ChatClient {
    client: Arc<reqwest::Client>,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    pub fn new(
        client: Arc<reqwest::Client>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one user prompt and returns the first choice's message content.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without a key, otherwise any network failure, non-success
    /// status, or a response without `choices[0].message.content`.
    pub async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(UpstreamError::NotConfigured { service: SERVICE });
        };
        with_retry(|| self.request(api_key, prompt)).await
    }

    async fn request(&self, api_key: &str, prompt: &str) -> Result<String, UpstreamError> {
        let endpoint = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: NARRATIVE_MAX_TOKENS,
        };

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| categorize_reqwest_error(SERVICE, e))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| categorize_reqwest_error(SERVICE, e))?;

        first_choice_content(&payload)
    }
}

fn first_choice_content(payload: &Value) -> Result<String, UpstreamError> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .ok_or_else(|| UpstreamError::Malformed {
            service: SERVICE,
            reason: "missing choices[0].message.content".to_string(),
        })
}
