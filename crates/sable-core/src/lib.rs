//! Core types and traits for the Sable coding agent.
//!
//! This crate provides the foundation types used across all other sable
//! crates. It has zero internal crate dependencies and only depends on
//! external libraries.
//!
//! ## Architecture
//!
//! sable-core sits at the bottom of the dependency hierarchy:
//! - Layer 1 (Foundation): sable-core
//! - Layer 2 (Infrastructure): sable-parser, sable-udiff
//! - Layer 3 (Domain): sable-tools
//! - Layer 4 (Application): sable (main crate)

pub mod message;
pub mod tool;
pub mod tool_name;

pub use message::{Action, MessageBlock};
pub use tool::Tool;
pub use tool_name::ToolName;
