//! Host message protocol for diff views.
//!
//! A host view requests content for a version pair; the core replies with
//! one rendering message shaped by the requested layout, always followed
//! by a stats message. All messages are tagged JSON objects discriminated
//! by a `command` field.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::diff::DiffStats;
use crate::render::{self, Layout, Mode, Rendering};

/// Messages a host view sends to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    RequestContent {
        mode: Mode,
        layout: Layout,
        from_id: PathBuf,
        to_id: PathBuf,
    },
}

/// Messages the core sends back to a host view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Response {
    #[serde(rename_all = "camelCase")]
    SetUnified { html: String },
    #[serde(rename_all = "camelCase")]
    SetSplit { from_html: String, to_html: String },
    #[serde(rename_all = "camelCase")]
    SetDiffStats { added: usize, removed: usize },
}

/// Serve one request: the rendering response for the requested layout,
/// then the stats response. Render failures surface as inline error
/// fragments inside a normal rendering response, never as a missing one.
pub fn handle_request(request: &Request) -> Vec<Response> {
    match request {
        Request::RequestContent {
            mode,
            layout,
            from_id,
            to_id,
        } => {
            let (rendering, stats) = render::render_diff(from_id, to_id, *mode, *layout);
            let mut responses = Vec::with_capacity(2);
            responses.push(match rendering {
                Rendering::Unified(html) => Response::SetUnified { html },
                Rendering::Split { from_html, to_html } => {
                    Response::SetSplit { from_html, to_html }
                }
            });
            responses.push(stats_response(stats));
            responses
        }
    }
}

fn stats_response(stats: DiffStats) -> Response {
    Response::SetDiffStats {
        added: stats.added,
        removed: stats.removed,
    }
}

/// CLI entry: run one content request and print each response as a JSON
/// line, exactly as a host view would receive them.
pub fn run_diff(from: &Path, to: &Path, mode: &str, layout: &str) -> anyhow::Result<()> {
    let request = Request::RequestContent {
        mode: Mode::parse(mode)?,
        layout: Layout::parse(layout)?,
        from_id: from.to_path_buf(),
        to_id: to.to_path_buf(),
    };
    for response in handle_request(&request) {
        println!("{}", serde_json::to_string(&response)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_request_wire_shape() {
        let json = r#"{
            "command": "requestContent",
            "mode": "source",
            "layout": "unified",
            "fromId": "/tmp/a.md",
            "toId": "/tmp/b.md"
        }"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(
            request,
            Request::RequestContent {
                mode: Mode::Source,
                layout: Layout::Unified,
                from_id: PathBuf::from("/tmp/a.md"),
                to_id: PathBuf::from("/tmp/b.md"),
            }
        );
    }

    #[test]
    fn test_response_wire_shape() {
        let unified = serde_json::to_value(Response::SetUnified {
            html: "<span></span>".to_string(),
        })
        .unwrap();
        assert_eq!(unified["command"], "setUnified");
        assert!(unified["html"].is_string());

        let split = serde_json::to_value(Response::SetSplit {
            from_html: "l".to_string(),
            to_html: "r".to_string(),
        })
        .unwrap();
        assert_eq!(split["command"], "setSplit");
        assert_eq!(split["fromHtml"], "l");
        assert_eq!(split["toHtml"], "r");

        let stats = serde_json::to_value(Response::SetDiffStats {
            added: 3,
            removed: 1,
        })
        .unwrap();
        assert_eq!(stats["command"], "setDiffStats");
        assert_eq!(stats["added"], 3);
        assert_eq!(stats["removed"], 1);
    }

    #[test]
    fn test_handle_request_emits_rendering_then_stats() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("old.md");
        let to = tmp.path().join("new.md");
        fs::write(&from, "# My Task\nline1\n").unwrap();
        fs::write(&to, "# My Task\nline1\nline2\n").unwrap();

        let responses = handle_request(&Request::RequestContent {
            mode: Mode::Source,
            layout: Layout::Unified,
            from_id: from,
            to_id: to,
        });
        assert_eq!(responses.len(), 2);
        match &responses[0] {
            Response::SetUnified { html } => assert!(html.contains("line2")),
            other => panic!("expected setUnified, got {:?}", other),
        }
        assert_eq!(
            responses[1],
            Response::SetDiffStats {
                added: 1,
                removed: 0
            }
        );
    }

    #[test]
    fn test_split_request_produces_split_response() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("old.md");
        let to = tmp.path().join("new.md");
        fs::write(&from, "a\n").unwrap();
        fs::write(&to, "a\nb\n").unwrap();

        let responses = handle_request(&Request::RequestContent {
            mode: Mode::Rendered,
            layout: Layout::Split,
            from_id: from,
            to_id: to,
        });
        assert!(matches!(responses[0], Response::SetSplit { .. }));
    }

    #[test]
    fn test_missing_file_still_yields_both_responses() {
        let tmp = TempDir::new().unwrap();
        let to = tmp.path().join("new.md");
        fs::write(&to, "a\n").unwrap();

        let responses = handle_request(&Request::RequestContent {
            mode: Mode::Source,
            layout: Layout::Unified,
            from_id: tmp.path().join("missing.md"),
            to_id: to,
        });
        assert_eq!(responses.len(), 2);
        match &responses[0] {
            Response::SetUnified { html } => assert!(html.contains("error")),
            other => panic!("expected setUnified, got {:?}", other),
        }
        assert_eq!(
            responses[1],
            Response::SetDiffStats {
                added: 0,
                removed: 0
            }
        );
    }
}
