//! Tool trait definition.
//!
//! This module defines the core `Tool` trait that all tool implementations
//! must implement. The trait is agnostic of the specific registry
//! implementation.

use std::path::Path;

use anyhow::Result;
use serde_json::Value;

/// Trait for tool implementations.
///
/// All tools must be Send + Sync because the registry is shared across
/// async tasks.
///
/// ## Return Format Contract
///
/// The agent loop determines success by checking:
/// 1. `exit_code` field (if present): non-zero means failure
/// 2. `error` field (if present): any value means failure
///
/// ### Success Format
/// - Return any JSON value (object, string, etc.)
/// - Do NOT include an "error" field
/// - For shell commands, include "exit_code": 0
///
/// ### Failure Format
/// - Return a JSON object with an "error" field containing the message
/// - For shell commands, also include "exit_code": <non-zero>
///
/// Tool implementations should return `Ok(json!({"error": ...}))` for
/// expected failures, not `Err`. Reserve `Err` for truly unexpected
/// conditions.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match exactly what the LLM emits as a tag name)
    fn name(&self) -> &'static str;

    /// Tool description for LLM context
    fn description(&self) -> &'static str;

    /// JSON Schema for tool parameters
    fn parameters(&self) -> Value;

    /// Execute the tool with given arguments.
    ///
    /// ## Arguments
    /// - `args`: JSON value containing tool arguments
    /// - `workspace`: Path to the workspace root
    async fn execute(&self, args: Value, workspace: &Path) -> Result<Value>;
}
