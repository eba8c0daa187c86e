//! Line-level diff between two versions of a document.
//!
//! Uses the `similar` crate's LCS line diff. The output is a sequence of
//! runs — unchanged, added, removed — covering both inputs in document
//! order. Every rendering downstream consumes this one sequence; nothing
//! recomputes the diff independently.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Classification of a run of consecutive lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Unchanged,
    Added,
    Removed,
}

/// A maximal run of consecutive lines sharing one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRun {
    pub kind: RunKind,
    /// Line text without trailing line terminators.
    pub lines: Vec<String>,
}

/// Added/removed line counts for a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

/// Compute the run sequence between `old` and `new`.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffRun> {
    let diff = TextDiff::from_lines(old, new);
    let mut runs: Vec<DiffRun> = Vec::new();
    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => RunKind::Unchanged,
            ChangeTag::Insert => RunKind::Added,
            ChangeTag::Delete => RunKind::Removed,
        };
        let line = change
            .value()
            .trim_end_matches('\n')
            .trim_end_matches('\r')
            .to_string();
        match runs.last_mut() {
            Some(run) if run.kind == kind => run.lines.push(line),
            _ => runs.push(DiffRun {
                kind,
                lines: vec![line],
            }),
        }
    }
    runs
}

/// Count added and removed lines across a run sequence.
pub fn stats(runs: &[DiffRun]) -> DiffStats {
    let mut stats = DiffStats::default();
    for run in runs {
        match run.kind {
            RunKind::Added => stats.added += run.lines.len(),
            RunKind::Removed => stats.removed += run.lines.len(),
            RunKind::Unchanged => {}
        }
    }
    stats
}
