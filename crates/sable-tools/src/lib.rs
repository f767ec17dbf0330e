//! Tool implementations for the Sable coding agent.
//!
//! Every tool implements the [`sable_core::Tool`] trait and reports
//! expected failures as `Ok(json!({"error": ...}))` per the return format
//! contract; `Err` is reserved for unexpected conditions like an unknown
//! tool name. The [`ToolRegistry`] owns the dispatch table and the
//! workspace root that file operations are confined to.

mod error;
mod file_ops;
mod patch_ops;
mod registry;
mod shell;
mod web;

pub use error::ToolError;
pub use file_ops::{CreateFileTool, DeleteFileTool, ReadFileTool, WriteFileTool};
pub use patch_ops::{ApplyPatchTool, EditFileTool};
pub use registry::ToolRegistry;
pub use shell::RunCommandTool;
pub use web::WebFetchTool;
