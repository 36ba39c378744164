use crate::models::{Clipping, ClippingKind};
use std::fmt::Write;

/// Render the clippings as a Markdown document.
///
/// Grouping is presentation-only: the sequence is scanned for maximal runs
/// of consecutive entries with the same title (compared case-sensitively),
/// and each run gets its own heading. Two non-adjacent runs sharing a title
/// stay separate, in file order.
pub fn render_markdown(clippings: &[Clipping]) -> String {
    let mut out = String::from("# Kindle Clippings\n\n");

    for run in consecutive_runs(clippings) {
        let head = &run[0];
        let _ = writeln!(out, "## {}", head.title);
        if !head.author.is_empty() {
            let _ = writeln!(out, "**Author:** {}", head.author);
        }
        out.push('\n');

        for (i, clipping) in run.iter().enumerate() {
            match clipping.kind {
                ClippingKind::Highlight => {
                    let _ = writeln!(out, "{}. {}", i + 1, clipping.text);
                }
                ClippingKind::Note => {
                    let _ = writeln!(out, "{}. *Note:* {}", i + 1, clipping.text);
                }
                ClippingKind::Bookmark => {
                    let _ = writeln!(out, "{}. *Bookmark*", i + 1);
                }
            }
            if !clipping.location.is_empty() {
                let _ = writeln!(out, "   - Location: {}", clipping.location);
            }
            if !clipping.page.is_empty() {
                let _ = writeln!(out, "   - Page: {}", clipping.page);
            }
            out.push('\n');
        }

        out.push_str("---\n\n");
    }

    out
}

/// Render the clippings as a pretty-printed JSON array, in sequence order,
/// with no grouping transformation.
pub fn render_json(clippings: &[Clipping]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(clippings)
}

fn consecutive_runs(clippings: &[Clipping]) -> Vec<&[Clipping]> {
    let mut runs = Vec::new();
    let mut start = 0;

    for i in 1..clippings.len() {
        if clippings[i].title != clippings[start].title {
            runs.push(&clippings[start..i]);
            start = i;
        }
    }
    if start < clippings.len() {
        runs.push(&clippings[start..]);
    }

    runs
}
