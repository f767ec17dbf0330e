//! Web fetch tool.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde_json::{json, Value};

use sable_core::Tool;

use crate::file_ops::get_required_str;

/// Responses larger than this are truncated before being handed back to
/// the model.
const MAX_BODY_BYTES: usize = 100_000;

/// Tool that fetches a URL and returns the response body as text.
pub struct WebFetchTool {
    client: reqwest::Client,
}

impl WebFetchTool {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("sable-agent")
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for WebFetchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for WebFetchTool {
    fn name(&self) -> &'static str {
        "web_fetch"
    }

    fn description(&self) -> &'static str {
        "Fetch a URL over HTTP(S) and return the response body as text."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value, _workspace: &Path) -> Result<Value> {
        let url = match get_required_str(&args, "url") {
            Ok(u) => u,
            Err(e) => return Ok(e),
        };

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return Ok(json!({"error": format!("Request failed: {}", e)})),
        };
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return Ok(json!({"error": format!("Failed to read response body: {}", e)})),
        };

        let truncated = body.len() > MAX_BODY_BYTES;
        let content = if truncated {
            let mut end = MAX_BODY_BYTES;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            &body[..end]
        } else {
            &body
        };

        Ok(json!({
            "url": url,
            "status": status,
            "content": content,
            "truncated": truncated
        }))
    }
}
