//! # Brainmap
//!
//! A local-first graph and version-history engine for directories of
//! agent-written Markdown "brains".
//!
//! Brainmap scans a brain root (one directory per group, each holding
//! canonical documents plus machine-written snapshot and sidecar files),
//! reconciles the flat listing into a versioned-document model, extracts
//! wiki-links and Markdown links into a graph, and renders line diffs
//! between any two versions of a document. Everything is computed fresh
//! from disk on every call; there is no index and no cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────┐
//! │ Resolver │──▶│  Links   │──▶│  Graph  │
//! │ scan+ver │   │ extract  │   │snapshot │
//! └────┬─────┘   └──────────┘   └────┬────┘
//!      │                            │
//!      ▼              ┌─────────────┤
//! ┌──────────┐        ▼             ▼
//! │ Versions │   ┌──────────┐  ┌──────────┐
//! │ ordering │──▶│ Diff+    │  │  Search  │
//! └──────────┘   │ Render   │  │ (linear) │
//!                └────┬─────┘  └──────────┘
//!                     ▼
//!                ┌──────────┐
//!                │ Protocol │
//!                │ (JSON)   │
//!                └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! bmap graph --json                  # dump the node/link graph
//! bmap history g1/task.md            # list a document's versions
//! bmap diff <from> <to> --layout split
//! bmap search "rollout"
//! bmap pin g1                        # pin a group
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`frontmatter`] | Task-document frontmatter codec |
//! | [`resolver`] | Filesystem scan and snapshot grouping |
//! | [`links`] | Wiki-link and Markdown-link extraction |
//! | [`graph`] | Graph assembly, filtering, and activity views |
//! | [`versions`] | Chronological version ordering |
//! | [`search`] | Linear substring search with debouncing |
//! | [`diff`] | Line-level diff runs |
//! | [`render`] | Source/rendered, unified/split diff renderings |
//! | [`protocol`] | Host view message protocol |

pub mod config;
pub mod diff;
pub mod frontmatter;
pub mod graph;
pub mod links;
pub mod models;
pub mod protocol;
pub mod render;
pub mod resolver;
pub mod search;
pub mod versions;
