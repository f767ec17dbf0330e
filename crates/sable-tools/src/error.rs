//! Error types for tool dispatch.

use thiserror::Error;

/// Errors surfaced by the registry itself, as opposed to tool-level
/// failures which are reported inside the result JSON.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}
