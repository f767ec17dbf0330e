//! Tool registry: name-to-implementation dispatch table.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use sable_core::Tool;

use crate::error::ToolError;
use crate::file_ops::{CreateFileTool, DeleteFileTool, ReadFileTool, WriteFileTool};
use crate::patch_ops::{ApplyPatchTool, EditFileTool};
use crate::shell::RunCommandTool;
use crate::web::WebFetchTool;

/// Registry that owns all executable tools and the workspace root their
/// file operations are confined to.
///
/// All registered tools are Send + Sync, so the registry can be shared
/// across async tasks behind an `Arc`.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    workspace: PathBuf,
}

impl ToolRegistry {
    /// Create a registry with the default tool set for the given workspace.
    pub fn new(workspace: PathBuf) -> Self {
        let tool_list: Vec<Arc<dyn Tool>> = vec![
            Arc::new(ReadFileTool),
            Arc::new(WriteFileTool),
            Arc::new(CreateFileTool),
            Arc::new(DeleteFileTool),
            Arc::new(ApplyPatchTool),
            Arc::new(EditFileTool),
            Arc::new(RunCommandTool::new()),
            Arc::new(WebFetchTool::new()),
        ];

        let mut tools: HashMap<String, Arc<dyn Tool>> = HashMap::new();
        for tool in tool_list {
            tools.insert(tool.name().to_string(), tool);
        }
        tracing::debug!(count = tools.len(), "registered tools");

        Self { tools, workspace }
    }

    /// Execute a tool by name.
    ///
    /// Tool-level failures come back as `Ok` values carrying an `error`
    /// field (and `exit_code` for shell commands); `Err` means the tool
    /// name itself is unknown.
    pub async fn execute_tool(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let tool = Arc::clone(tool);
        tool.execute(args, &self.workspace).await
    }

    /// List all registered tool names.
    pub fn available_tools(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Tool metadata (name, description, parameter schema) for building the
    /// system prompt.
    pub fn tool_descriptions(&self) -> Vec<Value> {
        let mut descriptions: Vec<Value> = self
            .tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters()
                })
            })
            .collect();
        descriptions.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
        descriptions
    }

    pub fn workspace(&self) -> &PathBuf {
        &self.workspace
    }
}
