//! Top-level assistant message parser.

use std::sync::LazyLock;

use regex::Regex;

use sable_core::MessageBlock;

use crate::scanner::scan;

/// `<thinking>` wrapper with at most one adjacent whitespace character.
/// Thinking content is narrative, not a tool tag, so only the wrapper tags
/// are removed.
static THINKING_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<thinking>\s?").expect("Invalid thinking open regex"));
static THINKING_CLOSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s?</thinking>").expect("Invalid thinking close regex"));

/// Parse one raw LLM completion into an ordered sequence of blocks.
///
/// Deterministic, total, and side-effect free: malformed or unrecognized
/// tags degrade to plain text rather than failing, so every input produces
/// at least one block.
pub fn parse(message: &str) -> Vec<MessageBlock> {
    let stripped = THINKING_OPEN_REGEX.replace_all(message, "");
    let stripped = THINKING_CLOSE_REGEX.replace_all(&stripped, "");
    scan(&stripped)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sable_core::{MessageBlock, ToolName};

    use super::*;

    #[test]
    fn test_empty_message_yields_single_empty_block() {
        let blocks = parse("");
        assert_eq!(blocks, vec![MessageBlock::plain("")]);
    }

    #[test]
    fn test_tag_free_message_is_one_plain_block() {
        let msg = "I'll start by looking at the failing test.";
        let blocks = parse(msg);
        assert_eq!(blocks, vec![MessageBlock::plain(msg)]);
    }

    #[test]
    fn test_valid_tag_extraction() {
        let blocks = parse("<read_file><path>a.txt</path></read_file>");
        assert_eq!(blocks.len(), 1);
        let action = blocks[0].as_action().unwrap();
        assert_eq!(action.tool, ToolName::ReadFile);
        assert_eq!(action.param("path"), Some("a.txt"));
    }

    #[test]
    fn test_invalid_tag_passthrough() {
        let msg = "<bogus_tool><x>1</x></bogus_tool>";
        let blocks = parse(msg);
        assert_eq!(blocks, vec![MessageBlock::plain(msg)]);
    }

    #[test]
    fn test_narration_around_action() {
        let blocks = parse("Reading the file now.\n<read_file><path>src/lib.rs</path></read_file>\nDone.");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].as_plain(), Some("Reading the file now.\n"));
        assert_eq!(
            blocks[1].as_action().unwrap().param("path"),
            Some("src/lib.rs")
        );
        assert_eq!(blocks[2].as_plain(), Some("\nDone."));
    }

    #[test]
    fn test_adjacent_actions_have_no_empty_plain_between() {
        let blocks = parse(
            "<read_file><path>a</path></read_file><read_file><path>b</path></read_file>",
        );
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.as_action().is_some()));
    }

    #[test]
    fn test_content_param_when_no_nested_tags() {
        let blocks = parse("<attempt_completion>All tests pass.</attempt_completion>");
        let action = blocks[0].as_action().unwrap();
        assert_eq!(action.tool, ToolName::AttemptCompletion);
        assert_eq!(action.param("content"), Some("All tests pass."));
    }

    #[test]
    fn test_thinking_wrapper_stripped() {
        let blocks = parse("<thinking> I should read the file first. </thinking>ok");
        assert_eq!(blocks.len(), 1);
        // One whitespace char adjacent to each wrapper tag is consumed.
        assert_eq!(blocks[0].as_plain(), Some("I should read the file first.ok"));
    }

    #[test]
    fn test_thinking_does_not_hide_actions() {
        let blocks =
            parse("<thinking>plan</thinking><run_command><command>ls</command></run_command>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].as_plain(), Some("plan"));
        assert_eq!(
            blocks[1].as_action().unwrap().tool,
            ToolName::RunCommand
        );
    }

    #[test]
    fn test_unclosed_tag_is_plain_text() {
        let msg = "<read_file><path>a.txt</path>";
        let blocks = parse(msg);
        assert_eq!(blocks, vec![MessageBlock::plain(msg)]);
    }

    #[test]
    fn test_literal_less_than_survives() {
        let blocks = parse("check that x < 10 before looping");
        assert_eq!(
            blocks,
            vec![MessageBlock::plain("check that x < 10 before looping")]
        );
    }

    #[test]
    fn test_multi_param_action() {
        let blocks = parse(
            "<write_file><path>out.txt</path><content>hello\nworld</content></write_file>",
        );
        let action = blocks[0].as_action().unwrap();
        assert_eq!(action.tool, ToolName::WriteFile);
        let mut expected = HashMap::new();
        expected.insert("path".to_string(), "out.txt".to_string());
        expected.insert("content".to_string(), "hello\nworld".to_string());
        assert_eq!(action.params, expected);
    }
}
