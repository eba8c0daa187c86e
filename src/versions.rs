//! Version listing: orders a node's snapshots chronologically.
//!
//! Snapshot filenames carry no guaranteed ordering, so records are sorted
//! by file modification time. The live file is always appended last
//! regardless of its mtime relative to the stored snapshots.

use anyhow::Result;

use crate::config::Config;
use crate::models::{Node, VersionRecord};
use crate::resolver;

/// Chronological version list for a node: `[s1..sk, live]`.
///
/// Snapshots that can no longer be statted are skipped with a warning; a
/// deleted live file simply yields no final entry.
pub fn list_versions(node: &Node) -> Vec<VersionRecord> {
    let mut dated: Vec<(std::path::PathBuf, i64)> = Vec::new();
    for path in &node.version_paths {
        match resolver::mtime_ms(path) {
            Some(ms) => dated.push((path.clone(), ms)),
            None => {
                eprintln!("warning: could not stat snapshot {}", path.display());
            }
        }
    }
    dated.sort_by_key(|(_, ms)| *ms);

    let mut records: Vec<VersionRecord> = dated
        .into_iter()
        .enumerate()
        .map(|(index, (path, ms))| VersionRecord {
            id: path,
            label: format!("Version {}", index + 1),
            timestamp_ms: ms,
        })
        .collect();

    if node.path.exists() {
        records.push(VersionRecord {
            id: node.path.clone(),
            label: "Current".to_string(),
            timestamp_ms: resolver::mtime_ms(&node.path).unwrap_or(0),
        });
    }
    records
}

/// Human-readable date for a version record, used by the CLI listing.
pub fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// CLI entry: print a document's version history, oldest first.
pub fn run_history(config: &Config, reference: &str) -> Result<()> {
    let graph = crate::graph::build(&config.root())?;
    let Some(node) = crate::graph::find_node(&graph, reference) else {
        println!("No document matches '{}'.", reference);
        return Ok(());
    };

    let records = list_versions(node);
    if records.is_empty() {
        println!("No versions.");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {}  {}",
            record.label,
            format_timestamp(record.timestamp_ms),
            record.id.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn set_mtime(path: &Path, seconds_ago: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(seconds_ago))
            .unwrap();
    }

    #[test]
    fn test_versions_sorted_by_mtime_live_last() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("g1")).unwrap();
        fs::write(root.join("g1/task.md"), "# My Task\nline1\nline2\n").unwrap();
        fs::write(root.join("g1/task.md.resolved.2"), "# My Task\n").unwrap();
        fs::write(root.join("g1/task.md.resolved.1"), "# My Task\nline1\n").unwrap();
        // Deliberately out of filename order: .2 is the oldest snapshot.
        set_mtime(&root.join("g1/task.md.resolved.2"), 7200);
        set_mtime(&root.join("g1/task.md.resolved.1"), 3600);
        // The live file is older than every snapshot but still lists last.
        set_mtime(&root.join("g1/task.md"), 86400);

        let nodes = crate::resolver::scan(root).unwrap();
        let node = nodes.iter().find(|n| n.name == "task.md").unwrap();
        let versions = list_versions(node);

        assert_eq!(versions.len(), 3);
        assert_eq!(versions[0].id, root.join("g1/task.md.resolved.2"));
        assert_eq!(versions[0].label, "Version 1");
        assert_eq!(versions[1].id, root.join("g1/task.md.resolved.1"));
        assert_eq!(versions[1].label, "Version 2");
        assert_eq!(versions[2].id, root.join("g1/task.md"));
        assert_eq!(versions[2].label, "Current");
        assert!(versions[0].timestamp_ms <= versions[1].timestamp_ms);
    }

    #[test]
    fn test_deleted_head_lists_snapshots_only() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("g1")).unwrap();
        fs::write(root.join("g1/gone.md.resolved.1"), "old\n").unwrap();

        let nodes = crate::resolver::scan(root).unwrap();
        let node = nodes.iter().find(|n| n.name == "gone.md").unwrap();
        let versions = list_versions(node);
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].label, "Version 1");
    }

    #[test]
    fn test_single_snapshot_labels() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("g1")).unwrap();
        fs::write(root.join("g1/task.md"), "# My Task\nline1\nline2\n").unwrap();
        fs::write(root.join("g1/task.md.resolved.1"), "# My Task\nline1\n").unwrap();
        set_mtime(&root.join("g1/task.md.resolved.1"), 3600);

        let nodes = crate::resolver::scan(root).unwrap();
        let node = nodes.iter().find(|n| n.name == "task.md").unwrap();
        let versions = list_versions(node);
        let labels: Vec<&str> = versions.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["Version 1", "Current"]);
    }
}
