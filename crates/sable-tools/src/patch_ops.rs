//! Patch application tools: apply_patch (strict) and edit_file (fuzzy).

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value};

use sable_core::Tool;
use sable_udiff::{
    apply_patch, apply_patch_with_similarity, check_patch_format, parse_patch_input,
    patch_from_diff, Patch,
};

use crate::file_ops::{get_required_str, resolve_path};

/// Parse tool input that may be a JSON-serialized patch or diff text.
///
/// A JSON patch that fails the structural format check is not rejected
/// outright; the raw input is re-parsed as diff text before giving up.
fn parse_patch_arg(input: &str) -> Result<Patch, String> {
    match parse_patch_input(input) {
        Ok(patch) if check_patch_format(&patch) => Ok(patch),
        Ok(_) => {
            tracing::debug!("patch failed format check, retrying as diff text");
            patch_from_diff(input).map_err(|e| format!("Invalid patch: {}", e))
        }
        Err(e) => Err(format!("Invalid patch: {}", e)),
    }
}

/// Tool that applies a strict, positionally-trusted unified diff to a file.
pub struct ApplyPatchTool;

#[async_trait::async_trait]
impl Tool for ApplyPatchTool {
    fn name(&self) -> &'static str {
        "apply_patch"
    }

    fn description(&self) -> &'static str {
        "Apply a unified diff to a file. Hunk line numbers are trusted exactly, so the diff must be generated against the current file content."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file (relative to workspace)"
                },
                "patch": {
                    "type": "string",
                    "description": "Unified diff text, or a JSON-serialized patch object"
                }
            },
            "required": ["path", "patch"]
        })
    }

    async fn execute(&self, args: Value, workspace: &Path) -> Result<Value> {
        let path_str = match get_required_str(&args, "path") {
            Ok(p) => p,
            Err(e) => return Ok(e),
        };
        let patch_text = match get_required_str(&args, "patch") {
            Ok(p) => p,
            Err(e) => return Ok(e),
        };
        let resolved = match resolve_path(path_str, workspace) {
            Ok(p) => p,
            Err(e) => return Ok(json!({"error": e})),
        };
        if !resolved.exists() {
            return Ok(json!({"error": format!("File not found: {}", path_str)}));
        }

        let patch = match parse_patch_arg(patch_text) {
            Ok(p) => p,
            Err(e) => return Ok(json!({"error": e})),
        };
        let content = match fs::read_to_string(&resolved) {
            Ok(c) => c,
            Err(e) => return Ok(json!({"error": format!("Failed to read file: {}", e)})),
        };
        let new_content = match apply_patch(&content, &patch) {
            Ok(c) => c,
            Err(e) => return Ok(json!({"error": format!("Failed to apply patch: {}", e)})),
        };
        match fs::write(&resolved, &new_content) {
            Ok(()) => Ok(json!({
                "success": true,
                "path": path_str,
                "hunks_applied": patch.hunks.len()
            })),
            Err(e) => Ok(json!({"error": format!("Failed to write file: {}", e)})),
        }
    }
}

/// Tool that applies a loose unified diff by content similarity, tolerating
/// wrong or absent line numbers.
pub struct EditFileTool;

#[async_trait::async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &'static str {
        "edit_file"
    }

    fn description(&self) -> &'static str {
        "Edit a file using a unified diff located by content similarity. Line numbers in hunk headers are ignored; context lines anchor the edit."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file (relative to workspace)"
                },
                "diff": {
                    "type": "string",
                    "description": "Unified diff text with @@ hunk markers"
                }
            },
            "required": ["path", "diff"]
        })
    }

    async fn execute(&self, args: Value, workspace: &Path) -> Result<Value> {
        let path_str = match get_required_str(&args, "path") {
            Ok(p) => p,
            Err(e) => return Ok(e),
        };
        let diff = match get_required_str(&args, "diff") {
            Ok(d) => d,
            Err(e) => return Ok(e),
        };
        let resolved = match resolve_path(path_str, workspace) {
            Ok(p) => p,
            Err(e) => return Ok(json!({"error": e})),
        };
        if !resolved.exists() {
            return Ok(json!({"error": format!("File not found: {}", path_str)}));
        }

        let content = match fs::read_to_string(&resolved) {
            Ok(c) => c,
            Err(e) => return Ok(json!({"error": format!("Failed to read file: {}", e)})),
        };
        let new_content = match apply_patch_with_similarity(&content, diff) {
            Ok(c) => c,
            Err(e) => return Ok(json!({"error": format!("Failed to apply diff: {}", e)})),
        };
        match fs::write(&resolved, &new_content) {
            Ok(()) => Ok(json!({"success": true, "path": path_str})),
            Err(e) => Ok(json!({"error": format!("Failed to write file: {}", e)})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_apply_patch_from_diff_text() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "a\nb\nc").unwrap();

        let result = ApplyPatchTool
            .execute(
                json!({
                    "path": "f.txt",
                    "patch": "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c"
                }),
                dir.path(),
            )
            .await
            .unwrap();
        assert!(result.get("error").is_none());
        assert_eq!(result["hunks_applied"].as_u64(), Some(1));
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "a\nB\nc");
    }

    #[tokio::test]
    async fn test_apply_patch_from_json_patch() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "a\nb").unwrap();

        let patch = json!({
            "hunks": [{
                "oldStart": 2,
                "oldLines": 1,
                "newStart": 2,
                "newLines": 1,
                "header": "@@ -2 +2 @@",
                "lines": ["-b", "+B"]
            }]
        });
        let result = ApplyPatchTool
            .execute(
                json!({"path": "f.txt", "patch": patch.to_string()}),
                dir.path(),
            )
            .await
            .unwrap();
        assert!(result.get("error").is_none());
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "a\nB");
    }

    #[tokio::test]
    async fn test_apply_patch_rejects_bad_header() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "a").unwrap();

        let result = ApplyPatchTool
            .execute(
                json!({"path": "f.txt", "patch": "@@ bogus @@\n-a\n+b"}),
                dir.path(),
            )
            .await
            .unwrap();
        assert!(result["error"].as_str().unwrap().contains("Invalid patch"));
    }

    #[tokio::test]
    async fn test_apply_patch_rejects_out_of_order_hunks() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "a\nb\nc\nd").unwrap();

        let diff = "@@ -3 +3 @@\n-c\n+C\n@@ -1 +1 @@\n-a\n+A";
        let result = ApplyPatchTool
            .execute(json!({"path": "f.txt", "patch": diff}), dir.path())
            .await
            .unwrap();
        assert!(result.get("error").is_some());
        // File untouched on failure.
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "a\nb\nc\nd");
    }

    #[tokio::test]
    async fn test_edit_file_tolerates_wrong_line_numbers() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "line1\nline2\nline3").unwrap();

        let result = EditFileTool
            .execute(
                json!({
                    "path": "f.txt",
                    "diff": "@@ -99,2 +99,2 @@\n line1\n-line2\n+newline2\n line3"
                }),
                dir.path(),
            )
            .await
            .unwrap();
        assert!(result.get("error").is_none());
        assert_eq!(
            fs::read_to_string(dir.path().join("f.txt")).unwrap(),
            "line1\nnewline2\nline3"
        );
    }

    #[tokio::test]
    async fn test_edit_file_requires_hunk_markers() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "a").unwrap();

        let result = EditFileTool
            .execute(json!({"path": "f.txt", "diff": "-a\n+b"}), dir.path())
            .await
            .unwrap();
        assert!(result.get("error").is_some());
    }
}
