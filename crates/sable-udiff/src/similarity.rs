//! Similarity-based fuzzy patch application.
//!
//! LLM-produced diffs frequently carry wrong or absent line numbers. This
//! engine ignores hunk header numbers entirely: it splits each hunk into
//! segments (contiguous change runs with their adjacent context), then
//! locates each segment in the target by sliding a window and counting
//! position-wise line matches. It never fails on a bad match; worst case it
//! edits at a misaligned but best-effort location. The only errors are
//! syntactic: no `@@` delimiter lines, or zero hunks with bodies.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::PatchError;
use crate::patch::split_lines;

static HUNK_DELIM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@(.*)@@").expect("Invalid hunk delimiter regex"));

/// One hunk of the loose diff dialect: a free-form header and marker-prefixed
/// lines. Unlike the strict model, no numeric fields are tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub header: String,
    pub lines: Vec<String>,
}

/// A parsed loose diff.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnifiedDiff {
    pub hunks: Vec<DiffHunk>,
}

/// A contiguous run of deletions/additions within a hunk, bracketed by the
/// immediately-adjacent context lines. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HunkSegment {
    pub context_before: Vec<String>,
    pub minus_lines: Vec<String>,
    pub plus_lines: Vec<String>,
    pub context_after: Vec<String>,
}

impl HunkSegment {
    fn is_pure_addition(&self) -> bool {
        self.minus_lines.is_empty()
    }
}

/// Parse loose unified-diff text. Hunks are delimited purely by `@@...@@`
/// lines; any text between the double-at markers is accepted as the header
/// and no numeric validation happens. File header lines (`--- `, `+++ `) and
/// `\ No newline` markers are skipped. Blank lines inside a hunk are treated
/// as empty context.
pub fn parse_unified_diff(diff: &str) -> Result<UnifiedDiff, PatchError> {
    let mut hunks = Vec::new();
    let mut current: Option<DiffHunk> = None;
    let mut saw_delim = false;

    for line in diff.lines() {
        if line.starts_with("--- ") || line.starts_with("+++ ") {
            continue;
        }
        if let Some(caps) = HUNK_DELIM_REGEX.captures(line) {
            saw_delim = true;
            if let Some(hunk) = current.take() {
                if !hunk.lines.is_empty() {
                    hunks.push(hunk);
                }
            }
            current = Some(DiffHunk {
                header: caps[1].trim().to_string(),
                lines: Vec::new(),
            });
            continue;
        }
        let Some(hunk) = current.as_mut() else {
            continue;
        };
        match line.as_bytes().first() {
            Some(b' ' | b'+' | b'-') => hunk.lines.push(line.to_string()),
            None => hunk.lines.push(" ".to_string()),
            // Anything else (`\ No newline`, stray prose) is ignored.
            Some(_) => {}
        }
    }
    if let Some(hunk) = current.take() {
        if !hunk.lines.is_empty() {
            hunks.push(hunk);
        }
    }

    if !saw_delim {
        return Err(PatchError::MissingHunkMarker);
    }
    if hunks.is_empty() {
        return Err(PatchError::EmptyDiff);
    }
    Ok(UnifiedDiff { hunks })
}

fn is_change_line(line: Option<&String>) -> bool {
    matches!(
        line.map(|l| l.as_bytes().first()),
        Some(Some(b'+') | Some(b'-'))
    )
}

fn context_content(line: &str) -> String {
    line.strip_prefix(' ').unwrap_or(line).to_string()
}

/// Split a hunk into change segments. Each `-`/`+` run becomes one segment.
/// A context line hit while a run is pending closes the segment as its
/// `context_after` and seeds the next segment's `context_before`. An idle
/// context line belongs to the upcoming change when the next line is a
/// change, otherwise it extends the previous segment's trailing context.
pub fn split_hunk_into_segments(hunk: &DiffHunk) -> Vec<HunkSegment> {
    let mut segments: Vec<HunkSegment> = Vec::new();
    let mut before: Vec<String> = Vec::new();
    let mut minus: Vec<String> = Vec::new();
    let mut plus: Vec<String> = Vec::new();

    for (i, line) in hunk.lines.iter().enumerate() {
        match line.as_bytes().first() {
            Some(b'-') => minus.push(line[1..].to_string()),
            Some(b'+') => plus.push(line[1..].to_string()),
            _ => {
                let content = context_content(line);
                let in_change = !minus.is_empty() || !plus.is_empty();
                if in_change {
                    segments.push(HunkSegment {
                        context_before: std::mem::take(&mut before),
                        minus_lines: std::mem::take(&mut minus),
                        plus_lines: std::mem::take(&mut plus),
                        context_after: vec![content.clone()],
                    });
                    before.push(content);
                } else if is_change_line(hunk.lines.get(i + 1)) {
                    before.push(content);
                } else if let Some(last) = segments.last_mut() {
                    last.context_after.push(content);
                } else {
                    before.push(content);
                }
            }
        }
    }
    if !minus.is_empty() || !plus.is_empty() {
        segments.push(HunkSegment {
            context_before: before,
            minus_lines: minus,
            plus_lines: plus,
            context_after: Vec::new(),
        });
    }
    segments
}

/// Position-wise exact-match count between two line arrays, compared up to
/// the shorter length. Deliberately not edit distance.
pub fn compute_similarity(a: &[String], b: &[String]) -> usize {
    a.iter().zip(b.iter()).filter(|(x, y)| x == y).count()
}

/// Slide a window of `target.len()` over `lines` and return the offset with
/// the highest similarity score. The first occurrence of the maximum wins.
pub fn find_most_similar_block_index(lines: &[String], target: &[String]) -> usize {
    if target.is_empty() || lines.len() <= target.len() {
        return 0;
    }
    let mut best_index = 0;
    let mut best_score = 0;
    for offset in 0..=lines.len() - target.len() {
        let score = compute_similarity(&lines[offset..offset + target.len()], target);
        if score > best_score {
            best_score = score;
            best_index = offset;
        }
    }
    best_index
}

/// Apply loose unified-diff text to `source` by content similarity, ignoring
/// all header line numbers. Returns the complete new content joined with
/// `\n`, which normalizes any `\r\n` endings in the source.
pub fn apply_patch_with_similarity(source: &str, diff: &str) -> Result<String, PatchError> {
    let parsed = parse_unified_diff(diff)?;
    let mut lines = split_lines(source);
    for hunk in &parsed.hunks {
        for segment in split_hunk_into_segments(hunk) {
            apply_segment(&mut lines, &segment);
        }
    }
    Ok(lines.join("\n"))
}

fn apply_segment(lines: &mut Vec<String>, segment: &HunkSegment) {
    if segment.is_pure_addition() {
        let insert_at = if segment.context_before.is_empty() {
            lines.len()
        } else {
            let anchor = find_most_similar_block_index(lines, &segment.context_before);
            (anchor + segment.context_before.len()).min(lines.len())
        };
        lines.splice(insert_at..insert_at, segment.plus_lines.iter().cloned());
        return;
    }

    let mut key = Vec::with_capacity(
        segment.context_before.len() + segment.minus_lines.len() + segment.context_after.len(),
    );
    key.extend_from_slice(&segment.context_before);
    key.extend_from_slice(&segment.minus_lines);
    key.extend_from_slice(&segment.context_after);

    let index = find_most_similar_block_index(lines, &key);
    let minus_start = (index + segment.context_before.len()).min(lines.len());
    let minus_end = (minus_start + segment.minus_lines.len()).min(lines.len());

    // Only delete when the located slice actually resembles the minus lines;
    // a globally weak match must not destroy unrelated content.
    if compute_similarity(&lines[minus_start..minus_end], &segment.minus_lines) > 0 {
        lines.splice(minus_start..minus_end, segment.plus_lines.iter().cloned());
    } else {
        tracing::debug!(
            minus_start,
            "no matching lines at best offset, inserting without deleting"
        );
        lines.splice(minus_start..minus_start, segment.plus_lines.iter().cloned());
    }

    // Re-append trailing context only when the match left it missing;
    // a clean splice already has it in place.
    if !segment.context_after.is_empty() {
        let tail_start = minus_start + segment.plus_lines.len();
        let present = lines
            .get(tail_start..tail_start + segment.context_after.len())
            .map(|tail| tail == segment.context_after.as_slice())
            .unwrap_or(false);
        if !present {
            let at = tail_start.min(lines.len());
            lines.splice(at..at, segment.context_after.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_parse_unified_diff_basic() {
        let diff = "--- a/file.txt\n+++ b/file.txt\n@@ -1,2 +1,2 @@\n line1\n-line2\n+changed";
        let parsed = parse_unified_diff(diff).unwrap();
        assert_eq!(parsed.hunks.len(), 1);
        assert_eq!(parsed.hunks[0].header, "-1,2 +1,2");
        assert_eq!(parsed.hunks[0].lines, vec![" line1", "-line2", "+changed"]);
    }

    #[test]
    fn test_parse_unified_diff_multiple_hunks_and_blank_context() {
        let diff = "@@ -1 +1 @@\n-a\n+A\n\n@@ -9 +9 @@\n-z\n+Z";
        let parsed = parse_unified_diff(diff).unwrap();
        assert_eq!(parsed.hunks.len(), 2);
        // Blank line inside a hunk body becomes empty context.
        assert_eq!(parsed.hunks[0].lines, vec!["-a", "+A", " "]);
        assert_eq!(parsed.hunks[1].header, "-9 +9");
    }

    #[test]
    fn test_parse_unified_diff_accepts_free_form_headers() {
        let parsed = parse_unified_diff("@@ ... @@\n-old\n+new").unwrap();
        assert_eq!(parsed.hunks[0].header, "...");
    }

    #[test]
    fn test_parse_unified_diff_without_markers_fails() {
        assert_eq!(
            parse_unified_diff("-a\n+b"),
            Err(PatchError::MissingHunkMarker)
        );
        assert_eq!(parse_unified_diff(""), Err(PatchError::MissingHunkMarker));
    }

    #[test]
    fn test_parse_unified_diff_with_empty_hunks_fails() {
        assert_eq!(
            parse_unified_diff("@@ -1 +1 @@"),
            Err(PatchError::EmptyDiff)
        );
    }

    #[test]
    fn test_split_single_segment_with_context() {
        let hunk = DiffHunk {
            header: String::new(),
            lines: s(&[" a", "-b", "+B", " c"]),
        };
        let segments = split_hunk_into_segments(&hunk);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].context_before, s(&["a"]));
        assert_eq!(segments[0].minus_lines, s(&["b"]));
        assert_eq!(segments[0].plus_lines, s(&["B"]));
        assert_eq!(segments[0].context_after, s(&["c"]));
    }

    #[test]
    fn test_split_two_runs_share_middle_context() {
        let hunk = DiffHunk {
            header: String::new(),
            lines: s(&[" a", "-b", "+B", " c", "-d", "+D", " e"]),
        };
        let segments = split_hunk_into_segments(&hunk);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].context_after, s(&["c"]));
        assert_eq!(segments[1].context_before, s(&["c"]));
        assert_eq!(segments[1].minus_lines, s(&["d"]));
        assert_eq!(segments[1].context_after, s(&["e"]));
    }

    #[test]
    fn test_split_change_at_edges_has_no_context() {
        let hunk = DiffHunk {
            header: String::new(),
            lines: s(&["-first", "+FIRST"]),
        };
        let segments = split_hunk_into_segments(&hunk);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].context_before.is_empty());
        assert!(segments[0].context_after.is_empty());
    }

    #[test]
    fn test_split_trailing_idle_context_extends_previous_after() {
        let hunk = DiffHunk {
            header: String::new(),
            lines: s(&["-a", "+A", " b", " c"]),
        };
        let segments = split_hunk_into_segments(&hunk);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].context_after, s(&["b", "c"]));
    }

    #[test]
    fn test_compute_similarity_is_positional() {
        assert_eq!(compute_similarity(&s(&["a", "b", "c"]), &s(&["a", "x", "c"])), 2);
        // Same lines shifted by one score zero; this is not edit distance.
        assert_eq!(compute_similarity(&s(&["a", "b", "c"]), &s(&["b", "c"])), 0);
        assert_eq!(compute_similarity(&s(&[]), &s(&["a"])), 0);
    }

    #[test]
    fn test_find_most_similar_block_index_first_max_wins() {
        let lines = s(&["AAA", "BBB", "CCC", "DDD", "EEE"]);
        assert_eq!(find_most_similar_block_index(&lines, &s(&["BBB", "CCC"])), 1);
        // No offset matches anything: the first offset is reported.
        assert_eq!(find_most_similar_block_index(&lines, &s(&["XXX"])), 0);
        // Repeated equally-good matches resolve to the earliest.
        let repeated = s(&["x", "same", "y", "same", "z"]);
        assert_eq!(find_most_similar_block_index(&repeated, &s(&["same"])), 1);
    }

    #[test]
    fn test_apply_ignores_wrong_header_offsets() {
        let source = "line1\nline2\nline3";
        let diff = "@@ -40,2 +40,2 @@\n line1\n-line2\n+newline2\n line3";
        let result = apply_patch_with_similarity(source, diff).unwrap();
        assert_eq!(result, "line1\nnewline2\nline3");
    }

    #[test]
    fn test_apply_does_not_duplicate_trailing_context() {
        let source = "line1\nline2\nline3";
        let diff = "@@ @@\n line1\n-line2\n+newline2\n line3";
        let result = apply_patch_with_similarity(source, diff).unwrap();
        assert_eq!(result.matches("line3").count(), 1);
    }

    #[test]
    fn test_apply_multi_segment_hunk() {
        let source = "a\nb\nc\nd\ne";
        let diff = "@@ @@\n a\n-b\n+B\n c\n-d\n+D\n e";
        let result = apply_patch_with_similarity(source, diff).unwrap();
        assert_eq!(result, "a\nB\nc\nD\ne");
    }

    #[test]
    fn test_apply_pure_addition_to_empty_source() {
        let diff = "@@ -0,0 +1,2 @@\n+first\n+second";
        let result = apply_patch_with_similarity("", diff).unwrap();
        assert_eq!(result, "\nfirst\nsecond");
    }

    #[test]
    fn test_apply_pure_addition_anchors_on_context() {
        let source = "one\ntwo\nthree";
        let diff = "@@ @@\n two\n+extra";
        let result = apply_patch_with_similarity(source, diff).unwrap();
        assert_eq!(result, "one\ntwo\nextra\nthree");
    }

    #[test]
    fn test_apply_weak_match_inserts_without_deleting() {
        let source = "alpha\nbeta\ngamma";
        let diff = "@@ @@\n-completely_unrelated\n+inserted";
        let result = apply_patch_with_similarity(source, diff).unwrap();
        // Nothing resembling the minus lines exists, so nothing is removed.
        assert!(result.contains("alpha"));
        assert!(result.contains("beta"));
        assert!(result.contains("gamma"));
        assert!(result.contains("inserted"));
    }

    #[test]
    fn test_apply_reappends_context_when_match_was_imperfect() {
        let source = "x1\nmiddle\nx2";
        let diff = "@@ @@\n x1\n-middle\n+replaced\n different";
        let result = apply_patch_with_similarity(source, diff).unwrap();
        assert_eq!(result, "x1\nreplaced\ndifferent\nx2");
    }

    #[test]
    fn test_apply_normalizes_crlf_endings() {
        let source = "a\r\nb\r\nc";
        let diff = "@@ @@\n a\n-b\n+B\n c";
        let result = apply_patch_with_similarity(source, diff).unwrap();
        assert_eq!(result, "a\nB\nc");
    }
}
