//! # Brainmap CLI (`bmap`)
//!
//! The `bmap` binary is the primary interface for Brainmap. It provides
//! commands for inspecting the brain graph, listing document histories,
//! rendering diffs, searching, and editing group pin/tag state.
//!
//! ## Usage
//!
//! ```bash
//! bmap --config ./config/bmap.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bmap graph` | Print the node/link graph (optionally filtered by tag) |
//! | `bmap history <path>` | List a document's versions, oldest first |
//! | `bmap diff <from> <to>` | Render a diff between two version files |
//! | `bmap search "<query>"` | Search live documents |
//! | `bmap recent` | List groups by recent activity, pinned first |
//! | `bmap locate <path>` | Show a document's identity and backlinks |
//! | `bmap pin <group>` | Pin a group |
//! | `bmap unpin <group>` | Unpin a group |
//! | `bmap tag <group>` | Add or remove tags on a group |
//!
//! ## Examples
//!
//! ```bash
//! # Dump the full graph as JSON
//! bmap graph --json
//!
//! # Only groups tagged "infra"
//! bmap graph --tag infra
//!
//! # History, then a split rendered diff of two versions
//! bmap history g1/task.md
//! bmap diff g1/task.md.resolved.1 g1/task.md --mode rendered --layout split
//!
//! # Tag management
//! bmap tag g1 --add infra --remove stale
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use brainmap::{config, frontmatter, graph, protocol, search, versions};

/// Brainmap CLI — a local-first graph and version-history engine for
/// directories of agent-written Markdown documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; without one, a minimal default (`~/brains`) is used.
#[derive(Parser)]
#[command(
    name = "bmap",
    about = "Brainmap — a local-first graph and version-history engine for Markdown brains",
    version,
    long_about = "Brainmap scans a directory tree of agent-written Markdown documents, groups \
    numbered history snapshots under their canonical documents, extracts wiki-links and Markdown \
    links into a graph, and renders line diffs between any two versions."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/bmap.toml`. The brain root and search
    /// settings are read from this file.
    #[arg(long, global = true, default_value = "./config/bmap.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the brain graph.
    ///
    /// Scans the brain root, groups snapshots under their canonical
    /// documents, and extracts links. Every invocation re-reads the tree;
    /// there is no cached state to refresh.
    Graph {
        /// Only include groups carrying this tag (and their documents).
        #[arg(long)]
        tag: Option<String>,

        /// Emit the full graph as pretty-printed JSON.
        #[arg(long)]
        json: bool,
    },

    /// List a document's version history, oldest first.
    ///
    /// Versions are ordered by file modification time; the live document,
    /// when present, is always the final entry.
    History {
        /// Document path or name (e.g. `g1/task.md` or `task.md`).
        path: String,
    },

    /// Render a diff between two version files.
    ///
    /// Prints the protocol messages a host view would receive: one
    /// rendering message followed by a stats message, one JSON object
    /// per line.
    Diff {
        /// Older version file.
        from: PathBuf,

        /// Newer version file.
        to: PathBuf,

        /// Rendering mode: `source` or `rendered`.
        #[arg(long, default_value = "source")]
        mode: String,

        /// Layout: `unified` or `split`.
        #[arg(long, default_value = "unified")]
        layout: String,
    },

    /// Search live documents.
    ///
    /// Case-insensitive substring scan over filenames and content lines.
    /// Snapshots and sidecar files are excluded.
    Search {
        /// The search query string (minimum two characters).
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List groups by recent activity, pinned groups first.
    Recent {
        /// Maximum number of groups to list.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show a document's path, version count, and backlinks.
    Locate {
        /// Document path or name.
        path: String,
    },

    /// Pin a group so activity views list it first.
    Pin {
        /// Group directory name.
        group: String,
    },

    /// Remove a group's pin.
    Unpin {
        /// Group directory name.
        group: String,
    },

    /// Add or remove tags on a group.
    Tag {
        /// Group directory name.
        group: String,

        /// Tag to add (repeatable).
        #[arg(long = "add")]
        add: Vec<String>,

        /// Tag to remove (repeatable).
        #[arg(long = "remove")]
        remove: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing or broken config file falls back to the minimal default.
    let cfg = config::load_config(&cli.config).unwrap_or_else(|_| config::Config::minimal());

    match cli.command {
        Commands::Graph { tag, json } => {
            graph::run_graph(&cfg, tag.as_deref(), json)?;
        }
        Commands::History { path } => {
            versions::run_history(&cfg, &path)?;
        }
        Commands::Diff {
            from,
            to,
            mode,
            layout,
        } => {
            protocol::run_diff(&from, &to, &mode, &layout)?;
        }
        Commands::Search { query, limit } => {
            search::run_search(&cfg, &query, limit)?;
        }
        Commands::Recent { limit } => {
            graph::run_recent(&cfg, limit)?;
        }
        Commands::Locate { path } => {
            graph::run_locate(&cfg, &path)?;
        }
        Commands::Pin { group } => {
            frontmatter::run_pin(&cfg, &group, true)?;
        }
        Commands::Unpin { group } => {
            frontmatter::run_pin(&cfg, &group, false)?;
        }
        Commands::Tag { group, add, remove } => {
            frontmatter::run_tag(&cfg, &group, &add, &remove)?;
        }
    }

    Ok(())
}
