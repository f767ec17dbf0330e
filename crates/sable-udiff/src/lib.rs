//! Unified diff parsing, generation and application for surgical code edits.
//!
//! This crate carries both patch engines the agent's file-editing tools are
//! built on:
//!
//! - a **strict** engine ([`Patch`]/[`Hunk`], [`parse_hunk`],
//!   [`patch_from_diff`], [`apply_patch`], [`create_patch`]) that trusts the
//!   line numbers in hunk headers, and
//! - a **similarity** engine ([`parse_unified_diff`],
//!   [`apply_patch_with_similarity`]) that ignores header numbers entirely
//!   and locates each edit by line-content similarity, because LLM-authored
//!   diffs frequently carry wrong or absent offsets.
//!
//! # Architecture
//!
//! This is a **Layer 2 (Infrastructure)** crate:
//! - Depends on: nothing internal
//! - Used by: sable-tools (tool system)
//!
//! All operations are pure, synchronous functions over their arguments; no
//! shared state, no I/O. Callers may freely retry a failed apply since no
//! partial state exists until the final string is returned.

mod error;
mod generator;
mod patch;
mod similarity;

pub use error::PatchError;
pub use generator::create_patch;
pub use patch::{
    apply_patch, check_patch_format, parse_hunk, parse_patch_input, patch_from_diff, Hunk, Patch,
};
pub use similarity::{
    apply_patch_with_similarity, compute_similarity, find_most_similar_block_index,
    parse_unified_diff, split_hunk_into_segments, DiffHunk, HunkSegment, UnifiedDiff,
};
