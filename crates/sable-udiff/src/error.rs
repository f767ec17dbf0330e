//! Error types for unified diff parsing and application.

use thiserror::Error;

/// Error that occurred while parsing or applying a patch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatchError {
    /// A hunk header line matched neither `@@ -a +b @@` nor
    /// `@@ -a,n +b,m @@`.
    #[error("invalid hunk header: {0:?}")]
    Header(String),

    /// The diff text contained no `@@` hunk markers at all.
    #[error("no @@ hunk markers found in diff")]
    MissingHunkMarker,

    /// The diff text parsed but produced zero hunks.
    #[error("diff contained no hunks")]
    EmptyDiff,

    /// A hunk starts before the end of the previous hunk's output. The
    /// strict applier trusts each hunk's start line against the
    /// progressively rewritten file, which is only sound for ascending,
    /// non-overlapping hunks.
    #[error("hunk {index} is out of order or overlaps the previous hunk")]
    HunkOrder {
        /// Zero-based index of the offending hunk.
        index: usize,
    },
}
