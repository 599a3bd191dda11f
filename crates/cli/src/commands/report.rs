//! Plain-text rendering of a finished workflow run.
//!
//! Used by `ask --report` and by every `chat` turn.

use crag_graph::GraphRun;
use std::fmt::Write;

/// Characters of each source shown before truncation.
pub const PREVIEW_CHARS: usize = 200;

/// First [`PREVIEW_CHARS`] characters of `text`, with `...` when cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn heading(out: &mut String, title: &str, underline: char) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", underline.to_string().repeat(title.len()));
}

/// Render the answer, workflow details and sources of `run`.
///
/// With `trace`, the details also list the visited nodes.
pub fn render(run: &GraphRun, trace: bool) -> String {
    let state = &run.state;
    let mut out = String::new();

    heading(&mut out, "Answer", '=');
    let _ = writeln!(
        out,
        "{}",
        state.generation.as_deref().unwrap_or("No answer generated")
    );
    out.push('\n');

    heading(&mut out, "Workflow details", '-');
    let _ = writeln!(out, "Documents used: {}", state.documents.len());
    let web_search = if state.web_search {
        "used (some documents were not relevant)"
    } else if run.used_web_search() {
        "used (the first answer did not address the question)"
    } else {
        "not needed (all documents were relevant)"
    };
    let _ = writeln!(out, "Web search: {}", web_search);
    if trace {
        let path: Vec<&str> = run.visited.iter().map(|node| node.as_str()).collect();
        let _ = writeln!(out, "Path: {}", path.join(" -> "));
    }

    if !state.documents.is_empty() {
        out.push('\n');
        heading(&mut out, "Sources", '-');
        for (i, doc) in state.documents.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, doc.source().unwrap_or("web search"));
            let _ = writeln!(out, "   {}", preview(&doc.page_content).replace('\n', " "));
        }
    }

    out
}
