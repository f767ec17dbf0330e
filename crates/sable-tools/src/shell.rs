//! Shell command execution tool.

use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value};
use tokio::process::Command;

use sable_core::Tool;

use crate::file_ops::get_required_str;

/// Tool that runs a shell command in the workspace directory.
///
/// Results always carry an `exit_code` field; the agent loop treats any
/// non-zero code as a failed step.
pub struct RunCommandTool {
    shell: String,
}

impl RunCommandTool {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }

    /// Use a specific shell binary instead of `sh`.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for RunCommandTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &'static str {
        "run_command"
    }

    fn description(&self) -> &'static str {
        "Run a shell command in the workspace directory and return its output and exit code."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: Value, workspace: &Path) -> Result<Value> {
        let command = match get_required_str(&args, "command") {
            Ok(c) => c,
            Err(e) => return Ok(e),
        };

        tracing::debug!(command, "running shell command");
        let output = match Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .current_dir(workspace)
            .output()
            .await
        {
            Ok(o) => o,
            Err(e) => {
                return Ok(json!({
                    "error": format!("Failed to spawn command: {}", e),
                    "exit_code": -1
                }))
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        Ok(json!({
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
            "exit_code": exit_code
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_run_command_captures_stdout() {
        let dir = tempdir().unwrap();
        let result = RunCommandTool::new()
            .execute(json!({"command": "echo hello"}), dir.path())
            .await
            .unwrap();

        assert_eq!(result["exit_code"].as_i64(), Some(0));
        assert!(result["stdout"].as_str().unwrap().contains("hello"));
    }

    #[tokio::test]
    async fn test_run_command_nonzero_exit_code() {
        let dir = tempdir().unwrap();
        let result = RunCommandTool::new()
            .execute(json!({"command": "exit 3"}), dir.path())
            .await
            .unwrap();

        assert_eq!(result["exit_code"].as_i64(), Some(3));
    }

    #[tokio::test]
    async fn test_run_command_runs_in_workspace() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

        let result = RunCommandTool::new()
            .execute(json!({"command": "cat marker.txt"}), dir.path())
            .await
            .unwrap();

        assert_eq!(result["exit_code"].as_i64(), Some(0));
        assert!(result["stdout"].as_str().unwrap().contains("here"));
    }

    #[tokio::test]
    async fn test_run_command_missing_arg() {
        let dir = tempdir().unwrap();
        let result = RunCommandTool::new()
            .execute(json!({}), dir.path())
            .await
            .unwrap();
        assert!(result["error"].as_str().unwrap().contains("Missing"));
    }
}
