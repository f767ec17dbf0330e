//! Sable: an LLM coding agent driven by pseudo-XML tool tags.
//!
//! The model's completions are parsed by `sable-parser` into plain and
//! action blocks; actions dispatch through the `sable-tools` registry and
//! the results feed the next completion. See [`agent_loop::AgentLoop`].

pub mod agent_loop;
pub mod llm;

pub use agent_loop::{AgentLoop, LoopOutcome, MAX_TOOL_ITERATIONS};
pub use llm::{Completer, HttpCompleter, Role, Turn};
