//! Diff renderings: four views over one run sequence.
//!
//! Source and rendered modes, each in unified or split layout. The split
//! layouts keep both panes row-aligned by emitting spacer placeholders
//! opposite added/removed runs, so a host view can scroll them in sync.
//! Rendered mode passes each line through a line-local Markdown transform;
//! there is no multi-line block parsing and no nested emphasis resolution,
//! which is sufficient for agent-generated task documents.
//!
//! A file that cannot be read renders as an inline error fragment — the
//! caller always receives something displayable, never an error value.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::diff::{self, DiffRun, DiffStats, RunKind};

/// Whether lines render as raw source or as transformed Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Source,
    Rendered,
}

impl Mode {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "source" => Ok(Mode::Source),
            "rendered" => Ok(Mode::Rendered),
            other => bail!("Unknown mode: {}. Use source or rendered.", other),
        }
    }
}

/// Whether the diff renders as one stream or two aligned panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Unified,
    Split,
}

impl Layout {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "unified" => Ok(Layout::Unified),
            "split" => Ok(Layout::Split),
            other => bail!("Unknown layout: {}. Use unified or split.", other),
        }
    }
}

/// A produced rendering, shaped by the requested layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendering {
    Unified(String),
    Split { from_html: String, to_html: String },
}

const SPACER: &str = "<span class=\"line spacer\">&nbsp;</span>\n";

/// Diff two version files and render the requested (mode, layout) cell.
///
/// Both mode/layout combinations of the 2x2 are total here; there is no
/// fallback arm. Unreadable inputs yield an error fragment plus zero
/// stats.
pub fn render_diff(from: &Path, to: &Path, mode: Mode, layout: Layout) -> (Rendering, DiffStats) {
    let old = match std::fs::read_to_string(from) {
        Ok(content) => content,
        Err(err) => return (error_rendering(from, &err, layout), DiffStats::default()),
    };
    let new = match std::fs::read_to_string(to) {
        Ok(content) => content,
        Err(err) => return (error_rendering(to, &err, layout), DiffStats::default()),
    };

    let runs = diff::diff_lines(&old, &new);
    let stats = diff::stats(&runs);
    let rendering = match (mode, layout) {
        (Mode::Source, Layout::Unified) => Rendering::Unified(unified(&runs, Mode::Source)),
        (Mode::Rendered, Layout::Unified) => Rendering::Unified(unified(&runs, Mode::Rendered)),
        (Mode::Source, Layout::Split) => {
            let (from_html, to_html) = split(&runs, Mode::Source);
            Rendering::Split { from_html, to_html }
        }
        (Mode::Rendered, Layout::Split) => {
            let (from_html, to_html) = split(&runs, Mode::Rendered);
            Rendering::Split { from_html, to_html }
        }
    };
    (rendering, stats)
}

fn error_rendering(path: &Path, err: &std::io::Error, layout: Layout) -> Rendering {
    let fragment = format!(
        "<span class=\"line error\">Unable to read {}: {}</span>\n",
        escape(&path.display().to_string()),
        escape(&err.to_string())
    );
    match layout {
        Layout::Unified => Rendering::Unified(fragment),
        Layout::Split => Rendering::Split {
            from_html: fragment.clone(),
            to_html: fragment,
        },
    }
}

/// One stream: every line of every run, styled by its run kind.
fn unified(runs: &[DiffRun], mode: Mode) -> String {
    let mut out = String::new();
    for run in runs {
        for line in &run.lines {
            out.push_str(&line_span(line, run.kind, mode));
        }
    }
    out
}

/// Two row-aligned streams: removed runs emit left lines with right
/// spacers, added runs the mirror, unchanged runs emit both sides.
fn split(runs: &[DiffRun], mode: Mode) -> (String, String) {
    let mut left = String::new();
    let mut right = String::new();
    for run in runs {
        for line in &run.lines {
            match run.kind {
                RunKind::Unchanged => {
                    left.push_str(&line_span(line, run.kind, mode));
                    right.push_str(&line_span(line, run.kind, mode));
                }
                RunKind::Removed => {
                    left.push_str(&line_span(line, run.kind, mode));
                    right.push_str(SPACER);
                }
                RunKind::Added => {
                    left.push_str(SPACER);
                    right.push_str(&line_span(line, run.kind, mode));
                }
            }
        }
    }
    (left, right)
}

fn css_class(kind: RunKind) -> &'static str {
    match kind {
        RunKind::Unchanged => "unchanged",
        RunKind::Added => "added",
        RunKind::Removed => "removed",
    }
}

fn line_span(line: &str, kind: RunKind, mode: Mode) -> String {
    match mode {
        Mode::Source => format!(
            "<span class=\"line {}\">{}</span>\n",
            css_class(kind),
            escape(line)
        ),
        Mode::Rendered => format!(
            "<div class=\"line {}\">{}</div>\n",
            css_class(kind),
            markdown_line(line)
        ),
    }
}

/// Minimal line-local Markdown-to-markup transform.
pub fn markdown_line(line: &str) -> String {
    let trimmed = line.trim_start();

    if is_horizontal_rule(trimmed) {
        return "<hr/>".to_string();
    }

    let level = trimmed.bytes().take_while(|b| *b == b'#').count();
    if (1..=6).contains(&level) {
        if let Some(text) = trimmed[level..].strip_prefix(' ') {
            return format!("<h{}>{}</h{}>", level, inline(text), level);
        }
    }

    for (prefix, glyph) in [
        ("- [ ] ", "\u{2610}"), // unchecked box
        ("- [x] ", "\u{2611}"), // checked box
        ("- [X] ", "\u{2611}"),
        ("- [/] ", "\u{25D0}"), // in-progress
    ] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return format!("{} {}", glyph, inline(rest));
        }
    }
    if let Some(rest) = trimmed.strip_prefix("- ") {
        return format!("\u{2022} {}", inline(rest));
    }

    inline(line)
}

fn is_horizontal_rule(trimmed: &str) -> bool {
    trimmed.len() >= 3
        && (trimmed.chars().all(|c| c == '-')
            || trimmed.chars().all(|c| c == '*')
            || trimmed.chars().all(|c| c == '_'))
}

/// Inline transforms over an escaped line: code, links, bold, italic.
fn inline(text: &str) -> String {
    let escaped = escape(text);
    let with_code = replace_span(&escaped, "`", "<code>", "</code>");
    let with_links = replace_links(&with_code);
    let with_bold = replace_span(&with_links, "**", "<strong>", "</strong>");
    replace_span(&with_bold, "*", "<em>", "</em>")
}

/// Replace balanced `delim...delim` pairs with open/close tags. Unpaired
/// delimiters pass through untouched.
fn replace_span(text: &str, delim: &str, open: &str, close: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        match after.find(delim) {
            Some(len) if len > 0 => {
                out.push_str(&rest[..start]);
                out.push_str(open);
                out.push_str(&after[..len]);
                out.push_str(close);
                rest = &after[len + delim.len()..];
            }
            _ => break,
        }
    }
    out.push_str(rest);
    out
}

/// Turn `[title](dest)` spans into anchors.
fn replace_links(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find('[') {
        let after = &rest[start + 1..];
        let Some(title_len) = after.find(']') else {
            break;
        };
        let beyond = &after[title_len + 1..];
        if !beyond.starts_with('(') {
            out.push_str(&rest[..start + 1]);
            rest = after;
            continue;
        }
        let Some(dest_len) = beyond[1..].find(')') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            &beyond[1..1 + dest_len],
            &after[..title_len]
        ));
        rest = &beyond[1 + dest_len + 1..];
    }
    out.push_str(rest);
    out
}

/// Escape the HTML-significant characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn runs(old: &str, new: &str) -> Vec<DiffRun> {
        diff::diff_lines(old, new)
    }

    #[test]
    fn test_source_unified_preserves_raw_markdown() {
        let out = unified(&runs("# Title\n", "# Title\nnew <tag>\n"), Mode::Source);
        assert!(out.contains("<span class=\"line unchanged\"># Title</span>"));
        assert!(out.contains("<span class=\"line added\">new &lt;tag&gt;</span>"));
    }

    #[test]
    fn test_split_panes_stay_row_aligned() {
        let (left, right) = split(&runs("a\ndrop\n", "a\nadd\n"), Mode::Source);
        let left_rows = left.lines().count();
        let right_rows = right.lines().count();
        assert_eq!(left_rows, right_rows);
        assert!(left.contains("drop"));
        assert!(left.contains("spacer"));
        assert!(right.contains("add"));
        assert!(right.contains("spacer"));
        assert!(!right.contains("drop"));
    }

    #[test]
    fn test_markdown_line_headings() {
        assert_eq!(markdown_line("# Title"), "<h1>Title</h1>");
        assert_eq!(markdown_line("### Sub"), "<h3>Sub</h3>");
        // Seven hashes is not a heading.
        assert!(markdown_line("####### Nope").contains("#######"));
    }

    #[test]
    fn test_markdown_line_checkboxes_and_bullets() {
        assert_eq!(markdown_line("- [ ] todo"), "\u{2610} todo");
        assert_eq!(markdown_line("- [x] done"), "\u{2611} done");
        assert_eq!(markdown_line("- [/] doing"), "\u{25D0} doing");
        assert_eq!(markdown_line("- plain"), "\u{2022} plain");
    }

    #[test]
    fn test_markdown_line_rule_and_inline() {
        assert_eq!(markdown_line("---"), "<hr/>");
        assert_eq!(markdown_line("say `x` now"), "say <code>x</code> now");
        assert_eq!(markdown_line("**bold** *it*"), "<strong>bold</strong> <em>it</em>");
        assert_eq!(
            markdown_line("[doc](./doc.md)"),
            "<a href=\"./doc.md\">doc</a>"
        );
    }

    #[test]
    fn test_inline_unpaired_delimiters_pass_through() {
        assert_eq!(markdown_line("2 * 3"), "2 * 3");
        assert_eq!(markdown_line("a ` b"), "a ` b");
    }

    #[test]
    fn test_render_diff_all_four_cells() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("old.md");
        let to = tmp.path().join("new.md");
        fs::write(&from, "# T\nline1\n").unwrap();
        fs::write(&to, "# T\nline1\nline2\n").unwrap();

        for mode in [Mode::Source, Mode::Rendered] {
            for layout in [Layout::Unified, Layout::Split] {
                let (rendering, stats) = render_diff(&from, &to, mode, layout);
                assert_eq!(stats.added, 1);
                assert_eq!(stats.removed, 0);
                match (layout, rendering) {
                    (Layout::Unified, Rendering::Unified(html)) => {
                        assert!(html.contains("line2"));
                    }
                    (Layout::Split, Rendering::Split { from_html, to_html }) => {
                        assert!(to_html.contains("line2"));
                        assert!(from_html.contains("spacer"));
                    }
                    _ => panic!("layout/rendering mismatch"),
                }
            }
        }
    }

    #[test]
    fn test_rendered_mode_transforms_heading() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("old.md");
        let to = tmp.path().join("new.md");
        fs::write(&from, "# T\n").unwrap();
        fs::write(&to, "# T\n").unwrap();

        let (rendering, _) = render_diff(&from, &to, Mode::Rendered, Layout::Unified);
        match rendering {
            Rendering::Unified(html) => assert!(html.contains("<h1>T</h1>")),
            _ => panic!("expected unified"),
        }
    }

    #[test]
    fn test_unreadable_file_renders_inline_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.md");
        let to = tmp.path().join("new.md");
        fs::write(&to, "x\n").unwrap();

        let (rendering, stats) = render_diff(&missing, &to, Mode::Source, Layout::Split);
        assert_eq!(stats, DiffStats::default());
        match rendering {
            Rendering::Split { from_html, to_html } => {
                assert!(from_html.contains("error"));
                assert!(from_html.contains("Unable to read"));
                assert_eq!(from_html, to_html);
            }
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn test_mode_and_layout_parsing() {
        assert_eq!(Mode::parse("source").unwrap(), Mode::Source);
        assert_eq!(Layout::parse("split").unwrap(), Layout::Split);
        assert!(Mode::parse("fancy").is_err());
        assert!(Layout::parse("stacked").is_err());
    }
}
