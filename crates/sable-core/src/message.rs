//! Assistant message block types.
//!
//! One LLM completion parses into an ordered sequence of blocks: narrative
//! text to show the user, and validated tool invocations to dispatch. The
//! parser lives in `sable-parser`; these are the value objects it produces.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tool_name::ToolName;

/// A validated tool invocation extracted from an assistant message.
///
/// `tool` is always a member of the closed vocabulary; unrecognized tags
/// never construct an `Action`, they fall back to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The tool being invoked.
    pub tool: ToolName,
    /// Parameter name → trimmed value, extracted from nested tags (or the
    /// single `content` parameter when the tag body has no nested tags).
    pub params: HashMap<String, String>,
}

impl Action {
    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// One segment of a parsed assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBlock {
    /// Narrative text with no recognized tool tag. Adjacent plain runs are
    /// merged; no block is empty except the sole block of an empty message.
    Plain { content: String },
    /// A recognized tool invocation.
    Action { action: Action },
}

impl MessageBlock {
    /// Construct a plain block.
    pub fn plain(content: impl Into<String>) -> Self {
        Self::Plain {
            content: content.into(),
        }
    }

    /// Construct an action block.
    pub fn action(tool: ToolName, params: HashMap<String, String>) -> Self {
        Self::Action {
            action: Action { tool, params },
        }
    }

    /// The action, if this is an action block.
    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Self::Action { action } => Some(action),
            Self::Plain { .. } => None,
        }
    }

    /// The narrative content, if this is a plain block.
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Self::Plain { content } => Some(content),
            Self::Action { .. } => None,
        }
    }
}
