//! Graph builder: the single integration point consumers call through.
//!
//! Composes the version resolver's node list with the link extractor's
//! edges into one immutable snapshot. Every call re-scans the filesystem
//! and re-parses every document — there is deliberately no cache and no
//! invalidation, so two calls may disagree when the tree changed between
//! them. The only guarantee is internal consistency: links reference ids
//! present in the same snapshot.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::links;
use crate::models::{Graph, Link, LinkKind, Node, NodeKind};
use crate::resolver;
use crate::versions;

/// Build a fresh graph snapshot from `root`.
pub fn build(root: &Path) -> Result<Graph> {
    let nodes = resolver::scan(root)?;
    let links = links::extract_links(&nodes);
    Ok(Graph { nodes, links })
}

/// Derived reverse edges pointing at `id`, as backlink-kind links.
pub fn backlinks(graph: &Graph, id: &str) -> Vec<Link> {
    graph
        .links
        .iter()
        .filter(|link| link.target == id)
        .map(|link| Link {
            source: link.target.clone(),
            target: link.source.clone(),
            kind: LinkKind::Backlink,
        })
        .collect()
}

/// Restrict a graph to groups carrying `tag` (and the documents inside
/// them). Links between surviving nodes are kept; everything else drops.
pub fn filter_by_tag(graph: &Graph, tag: &str) -> Graph {
    let kept_groups: Vec<&Node> = graph
        .nodes
        .iter()
        .filter(|node| {
            node.kind == NodeKind::Directory
                && node
                    .metadata
                    .as_ref()
                    .map(|m| m.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
                    .unwrap_or(false)
        })
        .collect();

    let nodes: Vec<Node> = graph
        .nodes
        .iter()
        .filter(|node| {
            kept_groups
                .iter()
                .any(|group| node.path.starts_with(&group.path))
        })
        .cloned()
        .collect();

    let links = graph
        .links
        .iter()
        .filter(|link| {
            nodes.iter().any(|n| n.id == link.source) && nodes.iter().any(|n| n.id == link.target)
        })
        .cloned()
        .collect();

    Graph { nodes, links }
}

/// Group-directory nodes ordered for an activity view: pinned groups
/// first, then most recently updated.
pub fn recent_groups(graph: &Graph, limit: usize) -> Vec<&Node> {
    let mut groups: Vec<&Node> = graph
        .nodes
        .iter()
        .filter(|node| node.kind == NodeKind::Directory)
        .collect();
    groups.sort_by(|a, b| {
        let (a_pin, a_ts) = sort_key(a);
        let (b_pin, b_ts) = sort_key(b);
        b_pin.cmp(&a_pin).then(b_ts.cmp(&a_ts)).then(a.name.cmp(&b.name))
    });
    groups.truncate(limit);
    groups
}

fn sort_key(node: &Node) -> (bool, i64) {
    match node.metadata.as_ref() {
        Some(m) => (m.pinned, m.last_updated.unwrap_or(0)),
        None => (false, 0),
    }
}

/// Find the node a path or name refers to: exact id match first, then
/// path-suffix match, then basename match.
pub fn find_node<'a>(graph: &'a Graph, reference: &str) -> Option<&'a Node> {
    graph
        .nodes
        .iter()
        .find(|node| node.id == reference)
        .or_else(|| {
            graph
                .nodes
                .iter()
                .find(|node| node.path.ends_with(reference))
        })
        .or_else(|| graph.nodes.iter().find(|node| node.name == reference))
}

/// CLI entry: print the graph, optionally filtered by tag, as a summary
/// listing or as JSON.
pub fn run_graph(config: &Config, tag: Option<&str>, json: bool) -> Result<()> {
    let graph = build(&config.root())?;
    let graph = match tag {
        Some(tag) => filter_by_tag(&graph, tag),
        None => graph,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    if graph.nodes.is_empty() {
        println!("No nodes.");
        return Ok(());
    }
    println!("{} nodes, {} links", graph.nodes.len(), graph.links.len());
    for node in &graph.nodes {
        match node.kind {
            NodeKind::Directory => {
                let meta = node.metadata.as_ref();
                let files = meta.and_then(|m| m.file_count).unwrap_or(0);
                let pin = meta.map(|m| m.pinned).unwrap_or(false);
                println!(
                    "{} {}/ ({} files)",
                    if pin { "*" } else { " " },
                    node.name,
                    files
                );
            }
            _ => {
                println!(
                    "    {} ({} versions)",
                    node.name,
                    node.version_paths.len()
                );
            }
        }
    }
    Ok(())
}

/// CLI entry: list groups by recent activity, pinned first.
pub fn run_recent(config: &Config, limit: usize) -> Result<()> {
    let graph = build(&config.root())?;
    let groups = recent_groups(&graph, limit);
    if groups.is_empty() {
        println!("No groups.");
        return Ok(());
    }

    for node in groups {
        let meta = node.metadata.as_ref();
        let pin = meta.map(|m| m.pinned).unwrap_or(false);
        let updated = meta
            .and_then(|m| m.last_updated)
            .map(versions::format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {}  updated: {}",
            if pin { "*" } else { " " },
            node.name,
            updated
        );
    }
    Ok(())
}

/// CLI entry: show one node's identity, version count, and backlinks.
pub fn run_locate(config: &Config, reference: &str) -> Result<()> {
    let graph = build(&config.root())?;
    let Some(node) = find_node(&graph, reference) else {
        println!("No document matches '{}'.", reference);
        return Ok(());
    };

    println!("path: {}", node.path.display());
    println!("versions: {}", versions::list_versions(node).len());
    let back = backlinks(&graph, &node.id);
    if back.is_empty() {
        println!("backlinks: none");
    } else {
        println!("backlinks:");
        for link in back {
            println!("    {}", link.target);
        }
    }
    Ok(())
}
