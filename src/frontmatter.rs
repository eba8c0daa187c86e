//! Frontmatter codec for group task documents.
//!
//! A task document may start with a small metadata block delimited by `---`
//! lines. Exactly two keys are recognized: `pinned` (boolean) and `tags`
//! (inline array). Unrecognized lines inside the block are ignored so that
//! newer writers can add keys without breaking older readers.
//!
//! `parse` and `merge` are pure functions over content; `apply_to_file` is
//! the read-modify-write wrapper (whole-file read, compute, whole-file
//! overwrite — no partial writes).

use anyhow::{Context, Result};
use std::path::Path;

const DELIMITER: &str = "---";

/// Parsed frontmatter. `pinned: false` and empty `tags` are the absence
/// states and are never serialized back out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub pinned: bool,
    pub tags: Vec<String>,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        !self.pinned && self.tags.is_empty()
    }
}

/// Partial update merged over existing frontmatter; `None` leaves the
/// existing value in place.
#[derive(Debug, Clone, Default)]
pub struct FrontmatterUpdate {
    pub pinned: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Parse the leading frontmatter block of `content`.
///
/// Returns an empty record when the content does not begin with a `---`
/// line, or when no closing `---` is found before end of input.
pub fn parse(content: &str) -> Frontmatter {
    let block = match block_lines(content) {
        Some(lines) => lines,
        None => return Frontmatter::default(),
    };

    let mut fm = Frontmatter::default();
    for line in block {
        if let Some(value) = line.strip_prefix("pinned:") {
            fm.pinned = value.trim().eq_ignore_ascii_case("true");
        } else if let Some(value) = line.strip_prefix("tags:") {
            fm.tags = parse_inline_array(value.trim());
        }
        // Anything else inside the block is ignored (forward-compatible).
    }
    fm
}

/// The document body with any leading frontmatter block removed.
///
/// When no well-formed block is present, the whole content is the body.
pub fn body(content: &str) -> &str {
    // Walk byte offsets so the returned body keeps its exact original text.
    let first_end = match content.find('\n') {
        Some(nl) => nl,
        None => return content,
    };
    if content[..first_end].trim() != DELIMITER {
        return content;
    }
    let mut offset = first_end + 1;
    loop {
        let line_end = content[offset..]
            .find('\n')
            .map(|nl| offset + nl)
            .unwrap_or(content.len());
        if content[offset..line_end].trim() == DELIMITER {
            return if line_end < content.len() {
                &content[line_end + 1..]
            } else {
                ""
            };
        }
        if line_end >= content.len() {
            // No closing delimiter: not a frontmatter block at all.
            return content;
        }
        offset = line_end + 1;
    }
}

/// Merge `updates` over the frontmatter of `content` and re-serialize.
///
/// Updates win over existing values. A merged `pinned: false` or empty
/// `tags` is omitted entirely; when nothing remains the block is removed
/// and leading blank lines are trimmed from the body. Otherwise a canonical
/// block (`pinned` before `tags`) is emitted with exactly one newline
/// separating it from the body.
pub fn merge(content: &str, updates: &FrontmatterUpdate) -> String {
    let existing = parse(content);
    let merged = Frontmatter {
        pinned: updates.pinned.unwrap_or(existing.pinned),
        tags: updates.tags.clone().unwrap_or(existing.tags),
    };

    let body = body(content);
    if merged.is_empty() {
        return body.trim_start_matches(['\r', '\n']).to_string();
    }

    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    if merged.pinned {
        out.push_str("pinned: true\n");
    }
    if !merged.tags.is_empty() {
        out.push_str("tags: [");
        out.push_str(&merged.tags.join(", "));
        out.push_str("]\n");
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body.trim_start_matches(['\r', '\n']));
    out
}

/// Read `path`, merge `updates` into its frontmatter, and overwrite it.
pub fn apply_to_file(path: &Path, updates: &FrontmatterUpdate) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rewritten = merge(&content, updates);
    std::fs::write(path, rewritten)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Add and remove tags on `path`, preserving existing order and dropping
/// duplicates. Returns the resulting tag list.
pub fn edit_tags_on_file(path: &Path, add: &[String], remove: &[String]) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut tags = parse(&content).tags;
    for tag in add {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags.retain(|t| !remove.iter().any(|r| r.trim() == t));

    let rewritten = merge(
        &content,
        &FrontmatterUpdate {
            pinned: None,
            tags: Some(tags.clone()),
        },
    );
    std::fs::write(path, rewritten)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(tags)
}

/// CLI entry: set or clear the pinned flag on a group's task document.
pub fn run_pin(config: &crate::config::Config, group: &str, pinned: bool) -> Result<()> {
    let task = config.root().join(group).join(crate::resolver::TASK_FILE);
    apply_to_file(
        &task,
        &FrontmatterUpdate {
            pinned: Some(pinned),
            tags: None,
        },
    )?;
    println!("{} {}", if pinned { "Pinned" } else { "Unpinned" }, group);
    Ok(())
}

/// CLI entry: add and remove tags on a group's task document.
pub fn run_tag(
    config: &crate::config::Config,
    group: &str,
    add: &[String],
    remove: &[String],
) -> Result<()> {
    let task = config.root().join(group).join(crate::resolver::TASK_FILE);
    let tags = edit_tags_on_file(&task, add, remove)?;
    if tags.is_empty() {
        println!("No tags.");
    } else {
        println!("Tags: {}", tags.join(", "));
    }
    Ok(())
}

/// Lines strictly inside a well-formed block, or `None` when absent.
fn block_lines(content: &str) -> Option<Vec<&str>> {
    let mut lines = content.lines();
    match lines.next() {
        Some(first) if first.trim() == DELIMITER => {}
        _ => return None,
    }
    let mut block = Vec::new();
    for line in lines {
        if line.trim() == DELIMITER {
            return Some(block);
        }
        block.push(line.trim());
    }
    None
}

/// Parse `[a, "b", 'c']` into trimmed, unquoted, non-empty tokens.
fn parse_inline_array(value: &str) -> Vec<String> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    inner
        .split(',')
        .map(|token| {
            token
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .trim()
                .to_string()
        })
        .filter(|token| !token.is_empty())
        .collect()
}
