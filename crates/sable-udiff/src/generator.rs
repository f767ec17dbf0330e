//! Minimal unified diff generation.
//!
//! `create_patch` computes a diff between two texts without trying to be
//! byte-identical to standard `diff -u` output. It scans both line arrays in
//! lockstep and records change regions bounded by the first index where both
//! sides agree again, which is deliberately not an LCS alignment. The cost:
//! once the two sides disagree in length, the final change region extends to
//! the end of both texts. Regions before that are balanced, so hunk start
//! lines stay valid against the progressively rewritten file and
//! `apply_patch(src, create_patch(src, dst)) == dst` holds for all inputs.

use crate::patch::{split_lines, Hunk, Patch};

/// Lines of context emitted around each change region.
const CONTEXT: usize = 1;

/// A run of consecutive indices where the two texts disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChangeRegion {
    start: usize,
    end: usize,
}

/// Compute a minimal patch turning `old` into `new`.
///
/// Identical texts produce a patch with zero hunks. Each hunk carries one
/// line of leading/trailing context, all deletions before all additions,
/// and uses the single-line header grammar when both totals are 1.
pub fn create_patch(old: &str, new: &str) -> Patch {
    let a = split_lines(old);
    let b = split_lines(new);

    let hunks = change_regions(&a, &b)
        .into_iter()
        .map(|region| region_to_hunk(&a, &b, region))
        .collect();
    Patch { hunks }
}

fn line_eq(a: &[String], b: &[String], i: usize) -> bool {
    a.get(i) == b.get(i)
}

/// Lockstep scan: skip equal lines, then extend each region forward while
/// at least one side still differs at that index (an out-of-range side
/// counts as differing).
fn change_regions(a: &[String], b: &[String]) -> Vec<ChangeRegion> {
    let max_len = a.len().max(b.len());
    let mut regions = Vec::new();
    let mut i = 0;
    while i < max_len {
        if line_eq(a, b, i) {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        while end < max_len && !line_eq(a, b, end) {
            end += 1;
        }
        regions.push(ChangeRegion { start, end });
        i = end;
    }
    regions
}

fn region_to_hunk(a: &[String], b: &[String], region: ChangeRegion) -> Hunk {
    let hunk_start = region.start.saturating_sub(CONTEXT);
    let old_end = region.end.min(a.len());
    let new_end = region.end.min(b.len());

    let mut lines = Vec::new();
    for line in &a[hunk_start..region.start] {
        lines.push(format!(" {}", line));
    }
    for i in region.start..old_end {
        lines.push(format!("-{}", a[i]));
    }
    for i in region.start..new_end {
        lines.push(format!("+{}", b[i]));
    }
    let mut trailing = 0;
    for i in region.end..(region.end + CONTEXT) {
        if i < a.len() && i < b.len() && a[i] == b[i] {
            lines.push(format!(" {}", a[i]));
            trailing += 1;
        }
    }

    let leading = region.start - hunk_start;
    let old_lines = leading + old_end.saturating_sub(region.start) + trailing;
    let new_lines = leading + new_end.saturating_sub(region.start) + trailing;
    let old_start = hunk_start + 1;
    let new_start = hunk_start + 1;

    let header = if old_lines == 1 && new_lines == 1 {
        format!("@@ -{} +{} @@", old_start, new_start)
    } else {
        format!("@@ -{},{} +{},{} @@", old_start, old_lines, new_start, new_lines)
    };

    Hunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
        header,
        lines,
    }
}
