//! Core data models used throughout Brainmap.
//!
//! These types represent the nodes, links, and version records that flow
//! through the scan, search, and diff-rendering pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a graph node represents on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A canonical Markdown document.
    File,
    /// A brain (group) directory directly under the root.
    Directory,
    /// A group-level summary document (`summary.md`).
    Summary,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Sidecar and frontmatter metadata attached to a node.
///
/// The recognized fields are typed; any other keys a sidecar carries ride
/// along in `extra`, so unknown metadata survives a parse/serialize round
/// trip without weakening the rest of the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Last-update timestamp as an ISO-8601 string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Last-update timestamp in epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    /// Number of documents in a group directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Passthrough fields from the sidecar JSON that we do not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A logical document (or group directory) in the brain graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable identity: the canonical path rendered as a string. Unique
    /// within one graph snapshot.
    pub id: String,
    /// Canonical path of the live document (may no longer exist on disk
    /// when only snapshots survive).
    pub path: PathBuf,
    /// Basename of the canonical path.
    pub name: String,
    pub kind: NodeKind,
    /// Historical snapshot paths discovered for this document, in discovery
    /// order. Chronological ordering is the `versions` module's job. Never
    /// contains the canonical path itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub version_paths: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

impl Node {
    /// Construct a document node for a canonical path.
    pub fn file(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let kind = if name == "summary.md" {
            NodeKind::Summary
        } else {
            NodeKind::File
        };
        Node {
            id: path.to_string_lossy().to_string(),
            name,
            kind,
            path,
            version_paths: Vec::new(),
            metadata: None,
        }
    }

    /// Construct a group-directory node.
    pub fn directory(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Node {
            id: path.to_string_lossy().to_string(),
            name,
            kind: NodeKind::Directory,
            path,
            version_paths: Vec::new(),
            metadata: None,
        }
    }
}

/// How a link was expressed in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Wiki,
    Markdown,
    /// A derived reverse edge; never produced by extraction itself.
    Backlink,
}

/// A directed reference between two nodes of the same graph snapshot.
///
/// Both endpoints always name ids present in the snapshot; unresolvable
/// references are dropped during extraction, never materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
}

/// An immutable scan snapshot: all nodes plus the links between them.
///
/// Rebuilt from disk on every query; there is no caching layer and no
/// incremental patching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// One entry in a document's version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// File path of this snapshot (the live file for the final entry).
    pub id: PathBuf,
    pub label: String,
    /// Modification time in epoch milliseconds.
    pub timestamp_ms: i64,
}

/// Whether a search hit matched the filename or a content line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Content,
    Filename,
}

/// A search hit from the linear scan engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub file_path: PathBuf,
    /// Display name of the group the file belongs to.
    pub group_name: String,
    pub matched_file_name: String,
    /// Matching line preview (content matches only), truncated to 120 chars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_line: Option<String>,
    /// 1-based line number (content matches only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    pub kind: MatchKind,
}
