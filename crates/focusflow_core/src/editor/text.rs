//! Plain-text rendering of a document subtree (`innerText`).
//!
//! # Invariants
//! - Block elements are separated by exactly one newline (`p` by two).
//! - No leading or trailing line breaks come from block boundaries.
//! - Markup-only nodes (`img`, `input`) contribute nothing.

use crate::editor::dom::{is_block_tag, Document, NodeId, NodeKind};

enum Piece {
    Text(String),
    LineBreak,
    Break(usize),
}

/// Renders `id` the way a browser reports `innerText` for editor content.
pub fn inner_text(doc: &Document, id: NodeId) -> String {
    let mut pieces = Vec::new();
    for child in doc.children(id) {
        collect(doc, *child, &mut pieces);
    }

    let mut out = String::new();
    let mut pending_break = 0;
    let mut after_line_break = false;
    for piece in pieces {
        let chunk = match piece {
            Piece::Break(count) => {
                pending_break = pending_break.max(count);
                continue;
            }
            Piece::Text(text) if text.is_empty() => continue,
            Piece::Text(text) => text,
            Piece::LineBreak => "\n".to_string(),
        };
        if !out.is_empty() {
            // A `<br>` already ended the line the block boundary asks for.
            let owed = if after_line_break {
                pending_break.saturating_sub(1)
            } else {
                pending_break
            };
            out.extend(std::iter::repeat('\n').take(owed));
        }
        pending_break = 0;
        after_line_break = chunk == "\n";
        out.push_str(&chunk);
    }
    out
}

fn collect(doc: &Document, id: NodeId, pieces: &mut Vec<Piece>) {
    let element = match doc.kind(id) {
        NodeKind::Text(text) => {
            pieces.push(Piece::Text(text.clone()));
            return;
        }
        NodeKind::Element(element) => element,
    };

    match element.tag.as_str() {
        "br" => {
            if !is_trailing_break(doc, id) {
                pieces.push(Piece::LineBreak);
            }
        }
        "img" | "input" | "script" | "style" => {}
        tag => {
            let gap = match tag {
                "p" => 2,
                tag if is_block_tag(tag) => 1,
                _ => 0,
            };
            if gap > 0 {
                pieces.push(Piece::Break(gap));
            }
            for child in doc.children(id) {
                collect(doc, *child, pieces);
            }
            if gap > 0 {
                pieces.push(Piece::Break(gap));
            }
        }
    }
}

// A `<br>` closing a non-empty block does not start another line.
fn is_trailing_break(doc: &Document, id: NodeId) -> bool {
    let Some(parent) = doc.parent(id) else {
        return false;
    };
    let is_block_parent = doc.tag(parent).is_some_and(is_block_tag);
    let is_last = doc.children(parent).last() == Some(&id);
    let has_content_before = doc
        .children(parent)
        .iter()
        .take_while(|child| **child != id)
        .any(|child| !doc.text_content(*child).is_empty());
    is_block_parent && is_last && has_content_before
}
