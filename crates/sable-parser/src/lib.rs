//! Assistant message parsing for the Sable coding agent.
//!
//! This crate turns one raw LLM completion into an ordered sequence of
//! [`MessageBlock`]s: narrative text to display, and validated tool
//! invocations to dispatch.
//!
//! # Architecture
//!
//! This is a **Layer 2 (Infrastructure)** crate:
//! - Depends on: sable-core (for the tool vocabulary and block types)
//! - Used by: sable (agent loop)
//!
//! # Usage
//!
//! ```rust
//! use sable_parser::parse;
//!
//! let blocks = parse("On it.<read_file><path>src/main.rs</path></read_file>");
//! assert_eq!(blocks.len(), 2);
//! ```

mod parser;
mod scanner;

pub use parser::parse;
pub use sable_core::{Action, MessageBlock};
