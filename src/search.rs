//! Linear substring search over live documents.
//!
//! No index is built or maintained: every query walks the tree and scans
//! file contents line by line. Matching is case-insensitive substring.
//! Snapshots and sidecar files are excluded — search sees only what a
//! reader of the live documents would see.
//!
//! `DebouncedSearch` wraps the scan in a background worker for
//! keystroke-driven callers: queries arriving inside the debounce window
//! coalesce, and a superseded query's results are never delivered.

use anyhow::Result;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::time::Duration;
use walkdir::WalkDir;

use crate::config::Config;
use crate::frontmatter;
use crate::models::{MatchKind, SearchResult};
use crate::resolver::{METADATA_SUFFIX, SNAPSHOT_MARKER, TASK_FILE};

/// Queries shorter than this return no results.
pub const MIN_QUERY_LEN: usize = 2;

/// Maximum characters of a matched line kept in the preview.
const PREVIEW_CHARS: usize = 120;

/// Scan `root` for `query`, returning at most `max_results` hits.
///
/// Group directories are visited in name order; within a group, a
/// filename match on a document precedes that document's content matches.
/// The result cap is global and short-circuits the walk.
pub fn search(query: &str, root: &Path, max_results: usize) -> Vec<SearchResult> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN || max_results == 0 {
        return Vec::new();
    }

    let mut results = Vec::new();
    for group in group_dirs(root) {
        let group_name = group_display_name(&group);
        for file in document_files(&group) {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            if file_name.to_lowercase().contains(&query) {
                results.push(SearchResult {
                    file_path: file.to_path_buf(),
                    group_name: group_name.clone(),
                    matched_file_name: file_name.clone(),
                    matched_line: None,
                    line_number: None,
                    kind: MatchKind::Filename,
                });
                if results.len() >= max_results {
                    return results;
                }
            }

            let content = match std::fs::read_to_string(&file) {
                Ok(content) => content,
                Err(_) => continue,
            };
            for (index, line) in content.lines().enumerate() {
                if !line.to_lowercase().contains(&query) {
                    continue;
                }
                results.push(SearchResult {
                    file_path: file.to_path_buf(),
                    group_name: group_name.clone(),
                    matched_file_name: file_name.clone(),
                    matched_line: Some(preview(line)),
                    line_number: Some(index + 1),
                    kind: MatchKind::Content,
                });
                if results.len() >= max_results {
                    return results;
                }
            }
        }
    }
    results
}

fn preview(line: &str) -> String {
    line.trim().chars().take(PREVIEW_CHARS).collect()
}

/// Non-hidden group directories under the root, sorted by name.
fn group_dirs(root: &Path) -> Vec<std::path::PathBuf> {
    let mut dirs: Vec<std::path::PathBuf> = match std::fs::read_dir(root) {
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

/// Live Markdown documents inside one group, sorted by path. Snapshots and
/// sidecars are not documents.
fn document_files(group: &Path) -> Vec<std::path::PathBuf> {
    WalkDir::new(group)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.file_name().to_string_lossy().starts_with('.'))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            name.ends_with(".md")
                && !name.contains(SNAPSHOT_MARKER)
                && !name.ends_with(METADATA_SUFFIX)
        })
        .collect()
}

/// Display name for a group: the first `# ` heading of its task document's
/// body, falling back to the directory name.
fn group_display_name(group: &Path) -> String {
    if let Ok(content) = std::fs::read_to_string(group.join(TASK_FILE)) {
        for line in frontmatter::body(&content).lines() {
            if let Some(title) = line.trim().strip_prefix("# ") {
                return title.trim().to_string();
            }
        }
    }
    group
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// CLI entry: print search hits as a numbered listing.
pub fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.search.max_results);
    let results = search(query, &config.root(), limit);
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        match result.kind {
            MatchKind::Filename => {
                println!(
                    "{}. {} / {} (filename)",
                    i + 1,
                    result.group_name,
                    result.matched_file_name
                );
            }
            MatchKind::Content => {
                println!(
                    "{}. {} / {}:{}",
                    i + 1,
                    result.group_name,
                    result.matched_file_name,
                    result.line_number.unwrap_or(0)
                );
                println!(
                    "    \"{}\"",
                    result.matched_line.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

/// Background search worker that debounces rapid query submissions.
pub struct DebouncedSearch {
    queries: mpsc::Sender<String>,
}

impl DebouncedSearch {
    /// Spawn the worker. Results arrive on the returned receiver as
    /// `(query, results)` pairs; only the final query of a burst produces
    /// a delivery.
    pub fn spawn(
        root: std::path::PathBuf,
        max_results: usize,
        debounce: Duration,
    ) -> (Self, mpsc::Receiver<(String, Vec<SearchResult>)>) {
        let (query_tx, mut query_rx) = mpsc::channel::<String>(32);
        let (result_tx, result_rx) = mpsc::channel::<(String, Vec<SearchResult>)>(32);

        tokio::spawn(async move {
            let mut pending: Option<String> = None;
            loop {
                let mut query = match pending.take() {
                    Some(query) => query,
                    None => match query_rx.recv().await {
                        Some(query) => query,
                        None => return,
                    },
                };
                // Coalesce: keep absorbing queries until the window stays
                // quiet, then run only the latest one.
                loop {
                    match tokio::time::timeout(debounce, query_rx.recv()).await {
                        Ok(Some(newer)) => query = newer,
                        Ok(None) => return,
                        Err(_) => break,
                    }
                }
                let results = search(&query, &root, max_results);
                // A query that arrived while scanning supersedes this one;
                // its results are stale and must not be delivered.
                if let Ok(newer) = query_rx.try_recv() {
                    pending = Some(newer);
                    continue;
                }
                if result_tx.send((query, results)).await.is_err() {
                    return;
                }
            }
        });

        (
            DebouncedSearch {
                queries: query_tx,
            },
            result_rx,
        )
    }

    /// Submit a query; it may be coalesced away by a newer one.
    pub async fn submit(&self, query: impl Into<String>) -> bool {
        self.queries.send(query.into()).await.is_ok()
    }
}
