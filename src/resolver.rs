//! Version resolver: reconciles a flat file listing into a versioned-file
//! model.
//!
//! A brain root contains one directory per group, each holding canonical
//! Markdown documents plus their machine-written companions:
//!
//! - `<name>.md` — the live document.
//! - `<name>.md.resolved.<N>` — a numbered history snapshot.
//! - `<name>.md.resolved` — an un-numbered duplicate of the live content;
//!   discarded to avoid double-counting.
//! - `<name>.md.metadata.json` — sidecar metadata attached to the canonical
//!   node, never a standalone node.
//!
//! Grouping key is the canonical path. A canonical path whose live file has
//! been deleted is still emitted as long as snapshots survive.

use anyhow::Result;
use globset::Glob;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::frontmatter;
use crate::models::{Node, NodeMetadata};

/// Infix marking a file as belonging to a canonical document's history.
pub const SNAPSHOT_MARKER: &str = ".resolved";

/// Suffix marking a sidecar metadata file.
pub const METADATA_SUFFIX: &str = ".metadata.json";

/// Name of the per-group task document carrying frontmatter.
pub const TASK_FILE: &str = "task.md";

#[derive(Default)]
struct CanonicalEntry {
    live_exists: bool,
    version_paths: Vec<PathBuf>,
    metadata: Option<NodeMetadata>,
}

/// Scan `root` and emit one node per canonical document, plus one directory
/// node per group.
///
/// A missing root is not an error: it yields an empty list, exactly as an
/// empty brain would.
pub fn scan(root: &Path) -> Result<Vec<Node>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let include = Glob::new("**/*.md*")?.compile_matcher();
    let mut canonicals: BTreeMap<PathBuf, CanonicalEntry> = BTreeMap::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("warning: skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !include.is_match(relative) {
            continue;
        }
        classify(path, &mut canonicals);
    }

    let mut nodes: Vec<Node> = Vec::new();
    for group in group_dirs(root) {
        nodes.push(group_node(&group, &canonicals));
    }
    for (canonical, entry) in canonicals {
        if !entry.live_exists && entry.version_paths.is_empty() {
            // A dangling sidecar with neither live file nor history.
            continue;
        }
        let mut node = Node::file(canonical);
        node.version_paths = entry.version_paths;
        node.metadata = entry.metadata;
        nodes.push(node);
    }
    Ok(nodes)
}

/// Sort a discovered path into its canonical bucket.
fn classify(path: &Path, canonicals: &mut BTreeMap<PathBuf, CanonicalEntry>) {
    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => return,
    };

    if file_name.ends_with(METADATA_SUFFIX) {
        let canonical = canonical_sibling(path, &file_name, METADATA_SUFFIX);
        if let Some(metadata) = read_sidecar(path) {
            canonicals.entry(canonical).or_default().metadata = Some(metadata);
        }
        return;
    }

    if let Some(marker_at) = file_name.find(SNAPSHOT_MARKER) {
        let canonical = path.with_file_name(&file_name[..marker_at]);
        let suffix = &file_name[marker_at + SNAPSHOT_MARKER.len()..];
        if is_numeric_suffix(suffix) {
            canonicals
                .entry(canonical)
                .or_default()
                .version_paths
                .push(path.to_path_buf());
        }
        // An un-numbered `.resolved` duplicates the live content and is
        // discarded; any other trailing text is not a recognized marker use.
        return;
    }

    if file_name.ends_with(".md") {
        canonicals.entry(path.to_path_buf()).or_default().live_exists = true;
    }
}

/// `.` followed by one or more ASCII digits.
fn is_numeric_suffix(suffix: &str) -> bool {
    match suffix.strip_prefix('.') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn canonical_sibling(path: &Path, file_name: &str, suffix: &str) -> PathBuf {
    let stem = file_name.strip_suffix(suffix).unwrap_or(file_name);
    path.with_file_name(stem)
}

/// Parse a sidecar JSON file; malformed content is reported and ignored.
fn read_sidecar(path: &Path) -> Option<NodeMetadata> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("warning: could not read sidecar {}: {}", path.display(), err);
            return None;
        }
    };
    match serde_json::from_str::<NodeMetadata>(&raw) {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            eprintln!(
                "warning: ignoring malformed sidecar {}: {}",
                path.display(),
                err
            );
            None
        }
    }
}

/// Non-hidden direct subdirectories of the root, sorted by name.
fn group_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = match std::fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map(|n| !n.to_string_lossy().starts_with('.'))
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    dirs.sort();
    dirs
}

/// Build the directory node for one group: document count, latest activity,
/// and the pin/tag state from the task document's frontmatter.
fn group_node(group: &Path, canonicals: &BTreeMap<PathBuf, CanonicalEntry>) -> Node {
    let mut node = Node::directory(group.to_path_buf());
    let mut metadata = NodeMetadata::default();

    let mut file_count: u64 = 0;
    let mut latest_ms: Option<i64> = None;
    for (canonical, entry) in canonicals.range(group.to_path_buf()..) {
        if !canonical.starts_with(group) {
            break;
        }
        if !entry.live_exists && entry.version_paths.is_empty() {
            continue;
        }
        file_count += 1;
        if let Some(ms) = mtime_ms(canonical) {
            latest_ms = Some(latest_ms.map_or(ms, |cur| cur.max(ms)));
        }
    }
    metadata.file_count = Some(file_count);
    if let Some(ms) = latest_ms {
        metadata.last_updated = Some(ms);
        metadata.updated_at = chrono::DateTime::from_timestamp_millis(ms)
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string());
    }

    if let Ok(content) = std::fs::read_to_string(group.join(TASK_FILE)) {
        let fm = frontmatter::parse(&content);
        metadata.pinned = fm.pinned;
        metadata.tags = fm.tags;
    }

    node.metadata = Some(metadata);
    node
}

/// Modification time of `path` in epoch milliseconds, when statable.
pub fn mtime_ms(path: &Path) -> Option<i64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let since = modified
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .ok()?;
    Some(since.as_millis() as i64)
}
