//! Conversion of Python scripts into notebooks.
//!
//! Scripts use the "percent" cell format: a line starting with `# %%` opens a
//! new code cell and `# %% [markdown]` opens a markdown cell whose lines are
//! written as comments. The inline metadata block, if any, is lifted into its
//! own hidden first cell so frontends can collapse it.

use crate::notebook::{Cell, Notebook};
use crate::pep723::extract_inline_meta;
use crate::NotebookResult;

const CELL_MARKER: &str = "# %%";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Code,
    Markdown,
}

/// Build a notebook from the text of a Python script.
pub fn notebook_from_script(script: &str) -> NotebookResult<Notebook> {
    let (inline_meta, body) = extract_inline_meta(script)?;

    let mut cells = Vec::new();
    if let Some(meta) = inline_meta {
        cells.push(Cell::code(meta.trim()).hidden());
    }
    cells.extend(split_percent_cells(&body));

    Ok(Notebook::new(cells))
}

fn split_percent_cells(body: &str) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut kind = PendingKind::Code;
    let mut explicit = false;
    let mut lines: Vec<&str> = Vec::new();

    for line in body.lines() {
        if let Some(header) = line.strip_prefix(CELL_MARKER) {
            flush_cell(&mut cells, kind, &lines, explicit);
            lines.clear();
            kind = if header.contains("[markdown]") || header.contains("[md]") {
                PendingKind::Markdown
            } else {
                PendingKind::Code
            };
            explicit = true;
            continue;
        }
        lines.push(line);
    }
    flush_cell(&mut cells, kind, &lines, explicit);

    cells
}

fn flush_cell(cells: &mut Vec<Cell>, kind: PendingKind, lines: &[&str], explicit: bool) {
    let text = trim_blank_lines(lines);
    // text before the first marker only becomes a cell when it has content
    if text.is_empty() && !explicit {
        return;
    }
    match kind {
        PendingKind::Code => cells.push(Cell::code(&text)),
        PendingKind::Markdown => {
            let markdown: Vec<&str> = text
                .lines()
                .map(|line| {
                    line.strip_prefix("# ")
                        .or_else(|| line.strip_prefix('#'))
                        .unwrap_or(line)
                })
                .collect();
            cells.push(Cell::markdown(&markdown.join("\n")));
        }
    }
}

fn trim_blank_lines(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
