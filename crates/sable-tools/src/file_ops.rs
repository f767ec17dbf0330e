//! File operation tools: read_file, write_file, create_file, delete_file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{json, Value};

use sable_core::Tool;

/// Null byte in the first 8 KiB marks the file as binary.
pub(crate) fn is_binary(content: &[u8]) -> bool {
    content[..content.len().min(8192)].contains(&0)
}

/// Resolve `path_str` against the workspace and reject anything that
/// escapes it. Non-existent paths are resolved through their deepest
/// existing ancestor so new files can still be containment-checked.
pub(crate) fn resolve_path(path_str: &str, workspace: &Path) -> Result<PathBuf, String> {
    let joined = if Path::new(path_str).is_absolute() {
        PathBuf::from(path_str)
    } else {
        workspace.join(path_str)
    };

    let root = workspace
        .canonicalize()
        .map_err(|e| format!("Cannot resolve workspace path: {}", e))?;

    let mut base = joined;
    let mut pending: Vec<std::ffi::OsString> = Vec::new();
    while !base.exists() {
        match (base.file_name(), base.parent()) {
            (Some(name), Some(parent)) if !parent.as_os_str().is_empty() => {
                pending.push(name.to_os_string());
                base = parent.to_path_buf();
            }
            _ => return Err(format!("Cannot resolve path: {}", path_str)),
        }
    }

    let mut canonical = base
        .canonicalize()
        .map_err(|e| format!("Cannot resolve path: {}", e))?;
    for part in pending.iter().rev() {
        canonical.push(part);
    }

    if !canonical.starts_with(&root) {
        return Err(format!(
            "Path '{}' is outside workspace (workspace: {})",
            path_str,
            workspace.display()
        ));
    }
    Ok(canonical)
}

/// Get a string argument from JSON, yielding a ready-to-return error value
/// if it is missing.
pub(crate) fn get_required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, Value> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| json!({"error": format!("Missing required argument: {}", key)}))
}

/// Tool for reading file contents.
pub struct ReadFileTool;

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read the contents of a text file in the workspace."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file (relative to workspace)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: Value, workspace: &Path) -> Result<Value> {
        let path_str = match get_required_str(&args, "path") {
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
        if resolved.is_dir() {
            return Ok(json!({"error": format!("Path is a directory: {}", path_str)}));
        }

        let bytes = match fs::read(&resolved) {
            Ok(b) => b,
            Err(e) => return Ok(json!({"error": format!("Failed to read file: {}", e)})),
        };
        if is_binary(&bytes) {
            return Ok(json!({"error": format!("Cannot read binary file: {}", path_str)}));
        }
        match String::from_utf8(bytes) {
            Ok(content) => Ok(json!({"content": content, "path": path_str})),
            Err(e) => Ok(json!({"error": format!("File is not valid UTF-8: {}", e)})),
        }
    }
}

/// Tool for writing file contents (creates or overwrites).
pub struct WriteFileTool;

#[async_trait::async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write content to a file, replacing any existing content. Creates parent directories as needed."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file (relative to workspace)"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: Value, workspace: &Path) -> Result<Value> {
        let path_str = match get_required_str(&args, "path") {
            Ok(p) => p,
            Err(e) => return Ok(e),
        };
        let content = match get_required_str(&args, "content") {
            Ok(c) => c,
            Err(e) => return Ok(e),
        };
        let resolved = match resolve_path(path_str, workspace) {
            Ok(p) => p,
            Err(e) => return Ok(json!({"error": e})),
        };

        if resolved.is_dir() {
            return Ok(json!({"error": format!("Path is a directory: {}", path_str)}));
        }
        if let Some(parent) = resolved.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return Ok(json!({"error": format!("Failed to create parent directories: {}", e)}));
            }
        }
        match fs::write(&resolved, content) {
            Ok(()) => Ok(json!({
                "success": true,
                "path": path_str,
                "bytes_written": content.len()
            })),
            Err(e) => Ok(json!({"error": format!("Failed to write file: {}", e)})),
        }
    }
}

/// Tool for creating a new file (fails if it already exists).
pub struct CreateFileTool;

#[async_trait::async_trait]
impl Tool for CreateFileTool {
    fn name(&self) -> &'static str {
        "create_file"
    }

    fn description(&self) -> &'static str {
        "Create a new file with the given content. Fails if the file already exists."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path for the new file (relative to workspace)"
                },
                "content": {
                    "type": "string",
                    "description": "Initial content"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: Value, workspace: &Path) -> Result<Value> {
        let path_str = match get_required_str(&args, "path") {
            Ok(p) => p,
            Err(e) => return Ok(e),
        };
        let content = match get_required_str(&args, "content") {
            Ok(c) => c,
            Err(e) => return Ok(e),
        };
        let resolved = match resolve_path(path_str, workspace) {
            Ok(p) => p,
            Err(e) => return Ok(json!({"error": e})),
        };

        if resolved.exists() {
            return Ok(json!({"error": format!("File already exists: {}", path_str)}));
        }
        if let Some(parent) = resolved.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return Ok(json!({"error": format!("Failed to create parent directories: {}", e)}));
            }
        }
        match fs::write(&resolved, content) {
            Ok(()) => Ok(json!({
                "success": true,
                "path": path_str,
                "bytes_written": content.len()
            })),
            Err(e) => Ok(json!({"error": format!("Failed to create file: {}", e)})),
        }
    }
}

/// Tool for deleting a file.
pub struct DeleteFileTool;

#[async_trait::async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &'static str {
        "delete_file"
    }

    fn description(&self) -> &'static str {
        "Delete a file from the workspace."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to delete (relative to workspace)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: Value, workspace: &Path) -> Result<Value> {
        let path_str = match get_required_str(&args, "path") {
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
        if resolved.is_dir() {
            return Ok(json!({"error": format!("Path is a directory, not a file: {}", path_str)}));
        }
        match fs::remove_file(&resolved) {
            Ok(()) => Ok(json!({"success": true, "path": path_str})),
            Err(e) => Ok(json!({"error": format!("Failed to delete file: {}", e)})),
        }
    }
}
