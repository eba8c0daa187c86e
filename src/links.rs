//! Link extractor: parses wiki-links and Markdown links out of document
//! bodies and resolves them against the known node set.
//!
//! Two grammars are applied to every document:
//!
//! 1. Wiki-links — `[[Target]]` or `[[Target|Alias]]`; only the part before
//!    the `|` matters. Resolution tries `Target.md` then the literal
//!    `Target` against a basename index of all known nodes.
//! 2. Markdown links — `[Title](destination)`; destinations beginning with
//!    `http` are external and skipped, everything else resolves as a path
//!    relative to the referencing document's directory and must match a
//!    known node path exactly.
//!
//! Unresolvable targets are dropped silently; an unreadable document
//! contributes zero links and a warning. Duplicates are not removed: the
//! same pair may appear once per grammar.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::models::{Link, LinkKind, Node, NodeKind};

/// Extract every resolvable link from the given nodes, in node order then
/// left-to-right occurrence (wiki matches before Markdown matches within a
/// document).
pub fn extract_links(nodes: &[Node]) -> Vec<Link> {
    // First node wins when two nodes share a basename.
    let mut by_name: HashMap<&str, &str> = HashMap::new();
    for node in nodes {
        by_name.entry(node.name.as_str()).or_insert(node.id.as_str());
    }
    let by_path: HashMap<&Path, &str> = nodes
        .iter()
        .map(|node| (node.path.as_path(), node.id.as_str()))
        .collect();

    let mut links = Vec::new();
    for node in nodes {
        if node.kind == NodeKind::Directory {
            continue;
        }
        let content = match std::fs::read_to_string(&node.path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!(
                    "warning: could not read {} for link extraction: {}",
                    node.path.display(),
                    err
                );
                continue;
            }
        };

        for target in wiki_targets(&content) {
            let with_ext = format!("{}.md", target);
            let resolved = by_name
                .get(with_ext.as_str())
                .or_else(|| by_name.get(target.as_str()));
            if let Some(target_id) = resolved {
                links.push(Link {
                    source: node.id.clone(),
                    target: (*target_id).to_string(),
                    kind: LinkKind::Wiki,
                });
            }
        }

        let base = node.path.parent().unwrap_or(Path::new(""));
        for destination in markdown_destinations(&content) {
            if destination.starts_with("http") {
                continue;
            }
            let absolute = normalize(base, Path::new(&destination));
            if let Some(target_id) = by_path.get(absolute.as_path()) {
                links.push(Link {
                    source: node.id.clone(),
                    target: (*target_id).to_string(),
                    kind: LinkKind::Markdown,
                });
            }
        }
    }
    links
}

/// Targets of `[[...]]` spans, left to right, alias stripped.
fn wiki_targets(content: &str) -> Vec<String> {
    let mut targets = Vec::new();
    let mut rest = content;
    while let Some(open) = rest.find("[[") {
        let after = &rest[open + 2..];
        match after.find("]]") {
            Some(close) => {
                let inner = &after[..close];
                let target = inner.split('|').next().unwrap_or("").trim();
                if !target.is_empty() {
                    targets.push(target.to_string());
                }
                rest = &after[close + 2..];
            }
            None => break,
        }
    }
    targets
}

/// Destinations of `[Title](destination)` spans, left to right.
fn markdown_destinations(content: &str) -> Vec<String> {
    let mut destinations = Vec::new();
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }
        // A second `[` opens a wiki-link, handled by the other grammar.
        if i + 1 < bytes.len() && bytes[i + 1] == b'[' {
            i += 2;
            continue;
        }
        let title_end = match content[i + 1..].find(']') {
            Some(end) => i + 1 + end,
            None => break,
        };
        if title_end + 1 >= bytes.len() || bytes[title_end + 1] != b'(' {
            i = title_end + 1;
            continue;
        }
        let dest_end = match content[title_end + 2..].find(')') {
            Some(end) => title_end + 2 + end,
            None => break,
        };
        let destination = content[title_end + 2..dest_end].trim();
        if !destination.is_empty() {
            destinations.push(destination.to_string());
        }
        i = dest_end + 1;
    }
    destinations
}

/// Lexically resolve `relative` against `base`: `.` is dropped, `..` pops,
/// no filesystem access.
fn normalize(base: &Path, relative: &Path) -> PathBuf {
    let mut resolved: Vec<Component> = base.components().collect();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(resolved.last(), Some(Component::Normal(_))) {
                    resolved.pop();
                }
            }
            other => resolved.push(other),
        }
    }
    resolved.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scan(root: &Path) -> Vec<Node> {
        crate::resolver::scan(root).unwrap()
    }

    #[test]
    fn test_wiki_targets_with_alias() {
        let targets = wiki_targets("see [[Plan]] and [[Notes|the notes]] but not [broken");
        assert_eq!(targets, vec!["Plan", "Notes"]);
    }

    #[test]
    fn test_markdown_destinations_skip_wiki_spans() {
        let dests = markdown_destinations("[[Wiki]] then [title](./a.md) and [x](http://e)");
        assert_eq!(dests, vec!["./a.md", "http://e"]);
    }

    #[test]
    fn test_wiki_resolution_naming_symmetry() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("g1")).unwrap();
        fs::write(tmp.path().join("g1/plan.md"), "target\n").unwrap();
        fs::write(tmp.path().join("g1/a.md"), "[[plan]]\n").unwrap();
        fs::write(tmp.path().join("g1/b.md"), "[[plan.md]]\n").unwrap();

        let nodes = scan(tmp.path());
        let links = extract_links(&nodes);
        let plan_id = tmp.path().join("g1/plan.md").to_string_lossy().to_string();
        let targets: Vec<&str> = links.iter().map(|l| l.target.as_str()).collect();
        // `[[plan]]` and `[[plan.md]]` resolve to the same node.
        assert_eq!(targets, vec![plan_id.as_str(), plan_id.as_str()]);
        assert!(links.iter().all(|l| l.kind == LinkKind::Wiki));
    }

    #[test]
    fn test_unresolvable_targets_drop_silently() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("g1")).unwrap();
        fs::write(
            tmp.path().join("g1/a.md"),
            "[[Missing]] and [gone](./gone.md) and [ext](https://example.com)\n",
        )
        .unwrap();

        let nodes = scan(tmp.path());
        let links = extract_links(&nodes);
        assert!(links.is_empty());
    }

    #[test]
    fn test_markdown_relative_resolution() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("g1/sub")).unwrap();
        fs::write(tmp.path().join("g1/target.md"), "t\n").unwrap();
        fs::write(tmp.path().join("g1/sub/a.md"), "[up](../target.md)\n").unwrap();

        let nodes = scan(tmp.path());
        let links = extract_links(&nodes);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind, LinkKind::Markdown);
        assert_eq!(
            links[0].target,
            tmp.path().join("g1/target.md").to_string_lossy()
        );
    }

    #[test]
    fn test_parallel_links_are_not_deduplicated() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("g1")).unwrap();
        fs::write(tmp.path().join("g1/target.md"), "t\n").unwrap();
        fs::write(
            tmp.path().join("g1/a.md"),
            "[[target]] and [also](./target.md)\n",
        )
        .unwrap();

        let nodes = scan(tmp.path());
        let links = extract_links(&nodes);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].kind, LinkKind::Wiki);
        assert_eq!(links[1].kind, LinkKind::Markdown);
        assert_eq!(links[0].target, links[1].target);
    }
}
