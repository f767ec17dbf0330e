//! LLM completion client.
//!
//! The agent loop talks to the model through the [`Completer`] trait so
//! tests can script completions without a network. [`HttpCompleter`] is the
//! production implementation, speaking the OpenAI-compatible chat
//! completions protocol.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::{json, Value};

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation history sent to the model.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Source of raw text completions.
#[async_trait::async_trait]
pub trait Completer: Send + Sync {
    /// Produce the next assistant message for the given conversation.
    async fn complete(&self, turns: &[Turn]) -> Result<String>;
}

/// Maximum tokens requested per completion.
const MAX_COMPLETION_TOKENS: u32 = 8192;

/// OpenAI-compatible HTTP completer.
pub struct HttpCompleter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpCompleter {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait::async_trait]
impl Completer for HttpCompleter {
    async fn complete(&self, turns: &[Turn]) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.model,
            "messages": turns,
            "max_tokens": MAX_COMPLETION_TOKENS
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("LLM request failed with status {}: {}", status, text);
        }

        let value: Value = response
            .json()
            .await
            .context("Failed to parse LLM response")?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("LLM response missing message content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_serializes_with_lowercase_role() {
        let turn = Turn::assistant("hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hello");
    }
}
