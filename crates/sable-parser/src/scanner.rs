//! Tag scanner for pseudo-XML tool calls embedded in completion text.
//!
//! Models emit tool calls as `<tool_name>...</tool_name>` tags inline with
//! their narrative text. The scanner walks the message once with an explicit
//! cursor: outside a tag it accumulates a plain run; at each `<` it attempts
//! to parse a complete balanced tag whose name is in the tool vocabulary.
//! On failure the single `<` joins the plain run and the cursor advances one
//! byte, so literal `<` characters and unknown tags survive as text and the
//! scan stays linear even on input full of stray angle brackets.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use sable_core::{MessageBlock, ToolName};

/// Opening tag at the start of a slice: `<name>` with a word-character name.
/// The matching closer is located by substring search since the closing name
/// must repeat the opening one.
static OPEN_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(\w+)>").expect("Invalid open tag regex"));

/// Scan a message into blocks. Adjacent plain runs (including stray `<`
/// characters) merge into one `PlainBlock`; an `ActionBlock` always breaks a
/// run. An empty message yields exactly one empty `PlainBlock`.
pub(crate) fn scan(message: &str) -> Vec<MessageBlock> {
    let mut blocks = Vec::new();
    let mut plain = String::new();
    let mut cursor = 0;

    while cursor < message.len() {
        match message[cursor..].find('<') {
            None => {
                plain.push_str(&message[cursor..]);
                break;
            }
            Some(rel) => {
                let lt = cursor + rel;
                plain.push_str(&message[cursor..lt]);
                match parse_action_at(message, lt) {
                    Some((tool, params, end)) => {
                        if !plain.is_empty() {
                            blocks.push(MessageBlock::Plain {
                                content: std::mem::take(&mut plain),
                            });
                        }
                        blocks.push(MessageBlock::action(tool, params));
                        cursor = end;
                    }
                    None => {
                        // Not a recognized tag: the `<` itself is plain text.
                        plain.push('<');
                        cursor = lt + 1;
                    }
                }
            }
        }
    }

    if !plain.is_empty() || blocks.is_empty() {
        blocks.push(MessageBlock::Plain { content: plain });
    }
    blocks
}

/// Try to parse a complete, vocabulary-validated tool tag starting at `pos`.
/// Returns the tool, its parameters, and the byte offset just past the
/// closing tag.
fn parse_action_at(
    message: &str,
    pos: usize,
) -> Option<(ToolName, HashMap<String, String>, usize)> {
    let (name, inner, end) = parse_tag_at(message, pos)?;
    let tool = ToolName::from_str(name)?;
    Some((tool, extract_params(inner), end))
}

/// Parse one balanced `<name>...</name>` tag starting at `pos`. The body is
/// everything up to the first matching closer (non-greedy).
fn parse_tag_at(text: &str, pos: usize) -> Option<(&str, &str, usize)> {
    let caps = OPEN_TAG_REGEX.captures(&text[pos..])?;
    let open = caps.get(0)?;
    let name = caps.get(1)?.as_str();

    let body_start = pos + open.end();
    let closer = format!("</{}>", name);
    let close_rel = text[body_start..].find(&closer)?;

    let inner = &text[body_start..body_start + close_rel];
    Some((name, inner, body_start + close_rel + closer.len()))
}

/// Extract parameters from a tag body.
///
/// If the body contains at least one complete one-level `<param>value</param>`
/// pair, every such pair becomes a parameter (values trimmed). Otherwise the
/// entire trimmed body becomes the single `content` parameter.
fn extract_params(inner: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut cursor = 0;

    while cursor < inner.len() {
        match inner[cursor..].find('<') {
            None => break,
            Some(rel) => {
                let lt = cursor + rel;
                if let Some((name, value, end)) = parse_tag_at(inner, lt) {
                    params.insert(name.to_string(), value.trim().to_string());
                    cursor = end;
                } else {
                    cursor = lt + 1;
                }
            }
        }
    }

    if params.is_empty() {
        params.insert("content".to_string(), inner.trim().to_string());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_at_balanced() {
        let text = "<read_file><path>a.txt</path></read_file>";
        let (name, inner, end) = parse_tag_at(text, 0).unwrap();
        assert_eq!(name, "read_file");
        assert_eq!(inner, "<path>a.txt</path>");
        assert_eq!(end, text.len());
    }

    #[test]
    fn test_parse_tag_at_unclosed() {
        assert!(parse_tag_at("<read_file>no closer here", 0).is_none());
        assert!(parse_tag_at("< not_a_tag>", 0).is_none());
        assert!(parse_tag_at("plain", 0).is_none());
    }

    #[test]
    fn test_parse_tag_at_mismatched_closer() {
        // `</path>` never closes `<read_file>`
        assert!(parse_tag_at("<read_file>x</path>", 0).is_none());
    }

    #[test]
    fn test_extract_params_nested() {
        let params = extract_params("<path> a.txt </path><mode>strict</mode>");
        assert_eq!(params.get("path").map(String::as_str), Some("a.txt"));
        assert_eq!(params.get("mode").map(String::as_str), Some("strict"));
    }

    #[test]
    fn test_extract_params_content_fallback() {
        let params = extract_params("  all done  ");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("content").map(String::as_str), Some("all done"));
    }

    #[test]
    fn test_extract_params_half_open_nested_tag() {
        // A `<` without a complete pair degrades to the content parameter.
        let params = extract_params("value for a < b");
        assert_eq!(
            params.get("content").map(String::as_str),
            Some("value for a < b")
        );
    }

    #[test]
    fn test_scan_merges_stray_angle_brackets() {
        let blocks = scan("a < b << c");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_plain(), Some("a < b << c"));
    }
}
