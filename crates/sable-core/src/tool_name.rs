//! Tool name enumeration.
//!
//! This module provides type-safe tool name handling through the `ToolName`
//! enum. The assistant message parser validates tag names against this
//! vocabulary at construction time, so an `Action` can never carry an
//! unknown tool identifier.

use serde::{Deserialize, Serialize};

/// Enumeration of all known tool names.
///
/// This is the closed vocabulary the message parser matches tag names
/// against. Tags whose name is not listed here degrade to plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    // === File Operations ===
    /// Read contents of a file
    ReadFile,
    /// Write contents to a file (overwrite)
    WriteFile,
    /// Create a new file
    CreateFile,
    /// Delete a file
    DeleteFile,
    /// Apply a strict unified diff to a file
    ApplyPatch,
    /// Apply a fuzzy, similarity-located diff to a file
    EditFile,

    // === Shell Execution ===
    /// Execute a shell command
    RunCommand,

    // === Web Operations ===
    /// Fetch a web page as text
    WebFetch,

    // === Loop Control ===
    /// Signal that the task is complete
    AttemptCompletion,
    /// Ask the user a clarifying question
    AskFollowup,
}

impl ToolName {
    /// Get the string representation of the tool name.
    ///
    /// This returns the exact tag name the LLM uses in its output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
            Self::CreateFile => "create_file",
            Self::DeleteFile => "delete_file",
            Self::ApplyPatch => "apply_patch",
            Self::EditFile => "edit_file",
            Self::RunCommand => "run_command",
            Self::WebFetch => "web_fetch",
            Self::AttemptCompletion => "attempt_completion",
            Self::AskFollowup => "ask_followup",
        }
    }

    /// Parse a tool name from a string.
    ///
    /// Returns `None` for unknown tool names.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "read_file" => Some(Self::ReadFile),
            "write_file" => Some(Self::WriteFile),
            "create_file" => Some(Self::CreateFile),
            "delete_file" => Some(Self::DeleteFile),
            "apply_patch" => Some(Self::ApplyPatch),
            "edit_file" => Some(Self::EditFile),
            "run_command" => Some(Self::RunCommand),
            "web_fetch" => Some(Self::WebFetch),
            "attempt_completion" => Some(Self::AttemptCompletion),
            "ask_followup" => Some(Self::AskFollowup),
            _ => None,
        }
    }

    /// All members of the vocabulary, in declaration order.
    pub fn all() -> &'static [ToolName] {
        &[
            Self::ReadFile,
            Self::WriteFile,
            Self::CreateFile,
            Self::DeleteFile,
            Self::ApplyPatch,
            Self::EditFile,
            Self::RunCommand,
            Self::WebFetch,
            Self::AttemptCompletion,
            Self::AskFollowup,
        ]
    }

    /// Check if this tool is read-only (doesn't modify files or execute
    /// commands).
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::ReadFile | Self::WebFetch | Self::AttemptCompletion | Self::AskFollowup
        )
    }

    /// Check if this tool terminates the agent loop instead of being
    /// dispatched to the registry.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AttemptCompletion | Self::AskFollowup)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for ToolName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_roundtrip() {
        for tool in ToolName::all() {
            let s = tool.as_str();
            let parsed = ToolName::from_str(s);
            assert_eq!(parsed, Some(*tool), "Roundtrip failed for {:?}", tool);
        }
    }

    #[test]
    fn test_tool_name_from_str_unknown() {
        assert_eq!(ToolName::from_str("bogus_tool"), None);
        assert_eq!(ToolName::from_str("thinking"), None);
        assert_eq!(ToolName::from_str(""), None);
    }

    #[test]
    fn test_is_read_only() {
        assert!(ToolName::ReadFile.is_read_only());
        assert!(ToolName::WebFetch.is_read_only());

        assert!(!ToolName::WriteFile.is_read_only());
        assert!(!ToolName::ApplyPatch.is_read_only());
        assert!(!ToolName::RunCommand.is_read_only());
    }

    #[test]
    fn test_is_terminal() {
        assert!(ToolName::AttemptCompletion.is_terminal());
        assert!(ToolName::AskFollowup.is_terminal());
        assert!(!ToolName::ReadFile.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ToolName::ReadFile), "read_file");
        assert_eq!(format!("{}", ToolName::AttemptCompletion), "attempt_completion");
    }

    #[test]
    fn test_serde_roundtrip() {
        let tool = ToolName::ApplyPatch;
        let json = serde_json::to_string(&tool).unwrap();
        assert_eq!(json, "\"apply_patch\"");

        let parsed: ToolName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tool);
    }
}
