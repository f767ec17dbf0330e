//! Strict patch model: hunk header parsing, format checking and positional
//! application.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PatchError;

/// Full header grammar: `@@ -<oldStart>,<oldLines> +<newStart>,<newLines> @@`.
static HEADER_FULL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+),(\d+) \+(\d+),(\d+) @@").expect("Invalid full header regex")
});

/// Single-line header grammar: `@@ -<oldStart> +<newStart> @@`, both line
/// counts defaulting to 1. LLM-authored diffs often omit the counts.
static HEADER_SHORT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@ -(\d+) \+(\d+) @@").expect("Invalid short header regex"));

/// One contiguous block of a unified diff.
///
/// Each entry in `lines` begins with exactly one marker character
/// (`' '` context, `'-'` deletion, `'+'` addition) followed by the
/// literal line content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// 1-based start line in the old file.
    pub old_start: usize,
    /// Count of `' '` + `'-'` entries.
    pub old_lines: usize,
    /// 1-based start line in the new file.
    pub new_start: usize,
    /// Count of `' '` + `'+'` entries.
    pub new_lines: usize,
    /// The raw `@@ ... @@` header line.
    pub header: String,
    /// Marker-prefixed body lines.
    pub lines: Vec<String>,
}

/// An ordered sequence of hunks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub hunks: Vec<Hunk>,
}

/// Parse one hunk starting at `lines[start]`, which must be a header line.
///
/// Returns the hunk and the index of the first unconsumed line. Body
/// collection takes every subsequent line starting with `' '`, `'+'` or
/// `'-'` and skips `\ No newline at end of file` markers.
pub fn parse_hunk(lines: &[&str], start: usize) -> Result<(Hunk, usize), PatchError> {
    let header = lines
        .get(start)
        .ok_or_else(|| PatchError::Header(String::new()))?;

    let (old_start, old_lines, new_start, new_lines) = parse_header(header)?;

    let mut body = Vec::new();
    let mut i = start + 1;
    while i < lines.len() {
        let line = lines[i];
        if line.starts_with('\\') {
            // `\ No newline at end of file`
            i += 1;
            continue;
        }
        if line.starts_with(' ') || line.starts_with('+') || line.starts_with('-') {
            body.push(line.to_string());
            i += 1;
        } else {
            break;
        }
    }

    Ok((
        Hunk {
            old_start,
            old_lines,
            new_start,
            new_lines,
            header: header.to_string(),
            lines: body,
        },
        i,
    ))
}

fn parse_header(header: &str) -> Result<(usize, usize, usize, usize), PatchError> {
    if let Some(caps) = HEADER_FULL_REGEX.captures(header) {
        let nums: Option<Vec<usize>> = (1..=4).map(|i| caps[i].parse().ok()).collect();
        if let Some(n) = nums {
            return Ok((n[0], n[1], n[2], n[3]));
        }
    }
    if let Some(caps) = HEADER_SHORT_REGEX.captures(header) {
        if let (Ok(old_start), Ok(new_start)) = (caps[1].parse(), caps[2].parse()) {
            return Ok((old_start, 1, new_start, 1));
        }
    }
    Err(PatchError::Header(header.to_string()))
}

/// Build a [`Patch`] from unified diff text.
///
/// `---`/`+++` file headers and any other metadata lines are skipped; each
/// `@@` line starts a hunk parsed with [`parse_hunk`].
pub fn patch_from_diff(text: &str) -> Result<Patch, PatchError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut hunks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].starts_with("@@") {
            let (hunk, next) = parse_hunk(&lines, i)?;
            hunks.push(hunk);
            i = next;
        } else {
            i += 1;
        }
    }
    Ok(Patch { hunks })
}

/// Structural format check: every body line carries a valid marker.
///
/// This does NOT verify that the numeric line counts match the array
/// contents; that looseness is relied on by callers handling
/// LLM-serialized patches. Callers must branch on the boolean and pick a
/// fallback (typically the diff-text parser) rather than expect an error.
pub fn check_patch_format(patch: &Patch) -> bool {
    patch.hunks.iter().all(|hunk| {
        hunk.lines
            .iter()
            .all(|line| matches!(line.as_bytes().first(), Some(b' ' | b'+' | b'-')))
    })
}

/// Parse patch input that is either a JSON-serialized [`Patch`] or unified
/// diff text. JSON is tried first; anything that doesn't deserialize is
/// treated as diff text.
pub fn parse_patch_input(input: &str) -> Result<Patch, PatchError> {
    if let Ok(patch) = serde_json::from_str::<Patch>(input) {
        return Ok(patch);
    }
    patch_from_diff(input)
}

/// Split text into lines, dropping a trailing `\r` per line. Both appliers
/// join their output with `\n`, so CRLF input comes out LF-normalized.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Apply a patch strictly positionally.
///
/// Hunks apply in sequence against the progressively rewritten line array,
/// each trusting its own `old_start` as an absolute 1-based line number in
/// the then-current array: lines before `old_start` are copied unchanged,
/// `'+'` body lines emit without advancing the source cursor, `'-'` lines
/// advance without emitting, `' '` lines emit and advance, and the
/// remaining source lines follow.
///
/// Hunks must be ascending and non-overlapping: each hunk may begin no
/// earlier than the line after the previous hunk's changed output (sharing
/// the previous hunk's trailing context is allowed). Violations fail with
/// [`PatchError::HunkOrder`] instead of silently producing garbage. No
/// other validation is performed: an `old_start` past the end of the file
/// simply appends, and deleted lines are not compared against the source.
pub fn apply_patch(source: &str, patch: &Patch) -> Result<String, PatchError> {
    let mut lines = split_lines(source);
    let mut min_start = 0usize;

    for (index, hunk) in patch.hunks.iter().enumerate() {
        let start = hunk.old_start.saturating_sub(1);
        if start < min_start {
            return Err(PatchError::HunkOrder { index });
        }

        let mut out: Vec<String> = Vec::with_capacity(lines.len() + hunk.lines.len());
        out.extend(lines.iter().take(start).cloned());

        let mut cursor = start;
        let mut emitted = 0usize;
        for line in &hunk.lines {
            match line.as_bytes().first() {
                Some(b'+') => {
                    out.push(line[1..].to_string());
                    emitted += 1;
                }
                Some(b'-') => {
                    cursor += 1;
                }
                Some(b' ') => {
                    out.push(line[1..].to_string());
                    cursor += 1;
                    emitted += 1;
                }
                _ => {}
            }
        }
        if cursor < lines.len() {
            out.extend(lines[cursor..].iter().cloned());
        }

        let trailing_context = hunk
            .lines
            .iter()
            .rev()
            .take_while(|line| line.starts_with(' '))
            .count();
        min_start = start + emitted - trailing_context;
        lines = out;
    }

    Ok(lines.join("\n"))
}
