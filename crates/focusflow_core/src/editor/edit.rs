//! Structural edit primitives behind the surface's commands.
//!
//! # Responsibility
//! - Insert text and markup at the caret, splitting lines where needed.
//! - Apply inline formatting, list toggling and outdent to the selection.
//!
//! # Invariants
//! - Every function leaves the selection pointing at attached nodes.
//! - Functions return `false` and leave the document untouched when they do
//!   not apply (no selection, collapsed range for formatting, no list item).

use crate::editor::dom::{byte_index, is_block_tag, is_line_tag, is_void_tag, Document, NodeId, Position};
use crate::editor::html::parse_fragment;
use crate::editor::surface::Selection;
use std::cmp::Ordering;

/// Nearest `div`/`p`/`li` enclosing `node`, never the surface root itself.
pub fn line_of(doc: &Document, node: NodeId) -> Option<NodeId> {
    let root = doc.root();
    doc.closest(node, root, |doc, id| {
        id != root && doc.tag(id).is_some_and(is_line_tag)
    })
}

/// Whether a line holds a checkbox control anywhere inside it.
pub fn has_checkbox(doc: &Document, line: NodeId) -> bool {
    doc.find_descendant(line, is_checkbox).is_some()
}

pub fn is_checkbox(doc: &Document, id: NodeId) -> bool {
    doc.has_tag(id, "input") && doc.attr(id, "type").is_some_and(|kind| kind.eq_ignore_ascii_case("checkbox"))
}

/// Caret position right after the deepest trailing content of `node`.
pub fn caret_after(doc: &Document, node: NodeId) -> Position {
    let mut current = node;
    loop {
        if doc.is_text(current) {
            return Position::new(current, doc.node_len(current));
        }
        let is_void = doc.tag(current).is_some_and(is_void_tag);
        match doc.children(current).last() {
            Some(child) if !is_void => current = *child,
            None if !is_void => return Position::new(current, 0),
            _ => return after(doc, current),
        }
    }
}

pub fn insert_text(doc: &mut Document, selection: &mut Option<Selection>, text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let Some(caret) = collapse_for_insert(doc, selection) else {
        return false;
    };
    let inserted = text.chars().count();

    let caret = if let Some(current) = doc.text(caret.node) {
        let mut updated = current.to_string();
        updated.insert_str(byte_index(&updated, caret.offset), text);
        doc.set_text(caret.node, updated);
        Position::new(caret.node, caret.offset + inserted)
    } else {
        let parent = caret.node;
        // A lone `<br>` only holds an empty line open.
        let placeholder = match doc.children(parent) {
            [only] if doc.has_tag(*only, "br") => Some(*only),
            _ => None,
        };
        if let Some(br) = placeholder {
            doc.detach(br);
        }
        let index = caret.offset.min(doc.children(parent).len());
        let previous = index
            .checked_sub(1)
            .and_then(|prev| doc.children(parent).get(prev).copied())
            .filter(|node| doc.is_text(*node));
        match previous {
            Some(node) => {
                let mut updated = doc.text(node).unwrap_or_default().to_string();
                updated.push_str(text);
                doc.set_text(node, updated);
                Position::new(node, doc.node_len(node))
            }
            None => {
                let node = doc.create_text(text);
                doc.insert_child(parent, index, node);
                Position::new(node, inserted)
            }
        }
    };
    *selection = Some(Selection::collapsed(caret));
    true
}

/// Inserts parsed `html` at the caret, like `insertHTML`.
///
/// Block-level markup inserted inside a `div`/`p` line splits the line at
/// the caret and lands between the halves; halves left empty are removed.
/// The caret ends after the inserted content.
pub fn insert_fragment(doc: &mut Document, selection: &mut Option<Selection>, html: &str) -> bool {
    let Some(caret) = collapse_for_insert(doc, selection) else {
        return false;
    };
    let nodes = parse_fragment(doc, html);
    let Some(last) = nodes.last().copied() else {
        return false;
    };
    let has_block = nodes
        .iter()
        .any(|node| doc.tag(*node).is_some_and(is_block_tag));
    let splittable_line = line_of(doc, caret.node).filter(|line| !doc.has_tag(*line, "li"));

    match splittable_line {
        Some(line) if has_block => {
            let right = split_up_to(doc, caret, line);
            let mut anchor = line;
            for node in &nodes {
                doc.insert_after(anchor, *node);
                anchor = *node;
            }
            if let Some(right) = right {
                if doc.is_visually_empty(right) {
                    doc.detach(right);
                }
            }
            if doc.is_visually_empty(line) {
                doc.detach(line);
            }
        }
        _ => {
            let (parent, index) = insertion_point(doc, caret);
            for (offset, node) in nodes.iter().enumerate() {
                doc.insert_child(parent, index + offset, *node);
            }
        }
    }

    *selection = Some(Selection::collapsed(caret_after(doc, last)));
    true
}

/// Removes the selected content; the caret collapses to the range start.
pub fn delete_selection(doc: &mut Document, selection: &mut Option<Selection>) -> bool {
    let Some(current) = *selection else {
        return false;
    };
    if current.is_collapsed() {
        return false;
    }
    let (start, end) = current.ordered(doc);
    let start_line = line_of(doc, start.node);
    let end_line = line_of(doc, end.node);
    let (start, end) = split_boundaries(doc, start, end);

    let removed = leaves_between(doc, start, end);
    let mut emptied = Vec::new();
    for leaf in &removed {
        if let Some(parent) = doc.parent(*leaf) {
            emptied.push(parent);
        }
        doc.detach(*leaf);
    }

    // Drop containers the deletion emptied, except the ones the caret and the
    // surviving end line live in.
    while let Some(node) = emptied.pop() {
        let protected = node == doc.root()
            || doc.contains(node, start.node)
            || Some(node) == end_line
            || !doc.children(node).is_empty();
        if protected {
            continue;
        }
        if let Some(parent) = doc.parent(node) {
            emptied.push(parent);
        }
        doc.detach(node);
    }

    if let (Some(first), Some(last)) = (start_line, end_line) {
        if first != last && doc.is_attached(first) && doc.is_attached(last) {
            doc.move_children_from(last, 0, first);
            doc.detach(last);
        }
    }

    *selection = Some(Selection::collapsed(start));
    true
}

/// Toggles an inline wrapper (`b`, `i`, `u`) over the selected text.
///
/// `tags[0]` is the element created; every tag in `tags` counts as already
/// formatted. When all selected text is formatted the wrappers are removed.
pub fn toggle_inline(doc: &mut Document, selection: &mut Option<Selection>, tags: &[&str]) -> bool {
    let Some(current) = *selection else {
        return false;
    };
    if current.is_collapsed() || tags.is_empty() {
        return false;
    }
    let (start, end) = current.ordered(doc);
    let (start, end) = split_boundaries(doc, start, end);
    let texts: Vec<NodeId> = leaves_between(doc, start, end)
        .into_iter()
        .filter(|node| doc.text(*node).is_some_and(|text| !text.is_empty()))
        .collect();
    let (Some(first), Some(last)) = (texts.first().copied(), texts.last().copied()) else {
        return false;
    };

    if texts.iter().all(|node| formatted_by(doc, *node, tags).is_some()) {
        for node in &texts {
            if let Some(wrapper) = formatted_by(doc, *node, tags) {
                doc.unwrap(wrapper);
            }
        }
    } else {
        let mut open_wrapper: Option<NodeId> = None;
        for node in &texts {
            if formatted_by(doc, *node, tags).is_some() {
                open_wrapper = None;
                continue;
            }
            match open_wrapper {
                Some(wrapper) if doc.next_sibling(wrapper) == Some(*node) => {
                    doc.append_child(wrapper, *node);
                }
                _ => {
                    let wrapper = doc.create_element(tags[0]);
                    doc.insert_before(*node, wrapper);
                    doc.append_child(wrapper, *node);
                    open_wrapper = Some(wrapper);
                }
            }
        }
    }

    *selection = Some(Selection::new(
        Position::new(first, 0),
        Position::new(last, doc.node_len(last)),
    ));
    true
}

/// Turns the caret's line into a list item of `list_tag`, or back out of it.
pub fn toggle_list(doc: &mut Document, selection: &mut Option<Selection>, list_tag: &str) -> bool {
    let Some(current) = *selection else {
        return false;
    };
    let caret = current.focus;
    let root = doc.root();
    let line = line_of(doc, caret.node);

    if let Some(item) = line.filter(|line| doc.has_tag(*line, "li")) {
        let Some(list) = doc.parent(item) else {
            return false;
        };
        if doc.has_tag(list, list_tag) {
            return outdent(doc, selection);
        }
        if doc.has_tag(list, "ul") || doc.has_tag(list, "ol") {
            doc.set_tag(list, list_tag);
            return true;
        }
        return false;
    }

    let item = doc.create_element("li");
    let list = doc.create_element(list_tag);
    doc.append_child(list, item);

    match line {
        Some(line) => {
            doc.move_children_from(line, 0, item);
            doc.insert_before(line, list);
            doc.detach(line);
        }
        None => {
            let Some(run) = inline_run(doc, caret) else {
                return false;
            };
            if let Some(first) = run.first() {
                doc.insert_before(*first, list);
            } else {
                doc.append_child(root, list);
            }
            for node in run {
                doc.append_child(item, node);
            }
        }
    }
    if doc.children(item).is_empty() {
        let br = doc.create_element("br");
        doc.append_child(item, br);
    }

    // Join a list directly above of the same kind.
    if let Some(previous) = doc.previous_sibling(list).filter(|prev| doc.has_tag(*prev, list_tag)) {
        doc.append_child(previous, item);
        doc.detach(list);
    }

    if !doc.is_attached(caret.node) || !doc.is_text(caret.node) {
        *selection = Some(Selection::collapsed(caret_after(doc, item)));
    }
    true
}

/// Promotes the caret's list item one level out of its list.
///
/// A top-level item becomes a `div` line between the two halves of its
/// list; a nested item moves after its parent item. Lists left empty are
/// removed.
pub fn outdent(doc: &mut Document, selection: &mut Option<Selection>) -> bool {
    let Some(current) = *selection else {
        return false;
    };
    let caret = current.focus;
    let root = doc.root();
    let Some(item) = doc.closest(caret.node, root, |doc, id| doc.has_tag(id, "li")) else {
        return false;
    };
    let Some(list) = doc
        .parent(item)
        .filter(|list| doc.has_tag(*list, "ul") || doc.has_tag(*list, "ol"))
    else {
        return false;
    };
    let Some(index) = doc.index_in_parent(item) else {
        return false;
    };
    let Some(outer) = doc.parent(list) else {
        return false;
    };

    let tail = if doc.children(list).len() > index + 1 {
        let tail = doc.clone_shallow(list);
        doc.move_children_from(list, index + 1, tail);
        doc.insert_after(list, tail);
        Some(tail)
    } else {
        None
    };

    let replacement = if doc.has_tag(outer, "li") {
        doc.insert_after(outer, item);
        if let Some(tail) = tail {
            doc.append_child(item, tail);
        }
        item
    } else {
        let line = doc.create_element("div");
        doc.move_children_from(item, 0, line);
        doc.insert_after(list, line);
        doc.detach(item);
        if doc.children(line).is_empty() {
            let br = doc.create_element("br");
            doc.append_child(line, br);
        }
        line
    };

    if doc.children(list).is_empty() {
        doc.detach(list);
    }

    if caret.node == item && replacement != item {
        let offset = caret.offset.min(doc.node_len(replacement));
        *selection = Some(Selection::collapsed(Position::new(replacement, offset)));
    }
    true
}

fn formatted_by(doc: &Document, node: NodeId, tags: &[&str]) -> Option<NodeId> {
    let root = doc.root();
    doc.closest(node, root, |doc, id| {
        id != root && doc.tag(id).is_some_and(|tag| tags.contains(&tag))
    })
}

// Resolves the selection to a caret, deleting any selected range first.
fn collapse_for_insert(doc: &mut Document, selection: &mut Option<Selection>) -> Option<Position> {
    let current = (*selection)?;
    if !current.is_collapsed() {
        delete_selection(doc, selection);
    }
    let caret = (*selection)?.focus;
    Some(normalize_caret(doc, caret))
}

// A caret "inside" a void element means before or after it.
fn normalize_caret(doc: &Document, caret: Position) -> Position {
    if doc.tag(caret.node).is_some_and(is_void_tag) {
        if caret.offset > 0 {
            return after(doc, caret.node);
        }
        return before(doc, caret.node);
    }
    caret
}

fn before(doc: &Document, node: NodeId) -> Position {
    match (doc.parent(node), doc.index_in_parent(node)) {
        (Some(parent), Some(index)) => Position::new(parent, index),
        _ => Position::new(doc.root(), 0),
    }
}

fn after(doc: &Document, node: NodeId) -> Position {
    let position = before(doc, node);
    if doc.parent(node).is_some() {
        Position::new(position.node, position.offset + 1)
    } else {
        position
    }
}

fn split_text(doc: &mut Document, node: NodeId, offset: usize) -> NodeId {
    let current = doc.text(node).unwrap_or_default().to_string();
    let at = byte_index(&current, offset);
    let right = doc.create_text(&current[at..]);
    doc.set_text(node, &current[..at]);
    doc.insert_after(node, right);
    right
}

// Element boundary where content would be inserted for `caret`.
fn insertion_point(doc: &mut Document, caret: Position) -> (NodeId, usize) {
    if !doc.is_text(caret.node) {
        return (caret.node, caret.offset);
    }
    let len = doc.node_len(caret.node);
    if caret.offset > 0 && caret.offset < len {
        split_text(doc, caret.node, caret.offset);
    }
    let boundary = if caret.offset == 0 {
        before(doc, caret.node)
    } else {
        after(doc, caret.node)
    };
    (boundary.node, boundary.offset)
}

// Splits every element from the caret up to and including `ancestor`;
// returns the right half of `ancestor`.
fn split_up_to(doc: &mut Document, caret: Position, ancestor: NodeId) -> Option<NodeId> {
    let (mut parent, mut index) = if doc.is_text(caret.node) {
        let right = split_text(doc, caret.node, caret.offset);
        (doc.parent(right)?, doc.index_in_parent(right)?)
    } else {
        (caret.node, caret.offset)
    };
    loop {
        let right = doc.clone_shallow(parent);
        doc.move_children_from(parent, index, right);
        doc.insert_after(parent, right);
        if parent == ancestor {
            return Some(right);
        }
        index = doc.index_in_parent(right)?;
        parent = doc.parent(parent)?;
    }
}

// Turns both range ends into element boundaries, splitting text nodes.
fn split_boundaries(doc: &mut Document, start: Position, end: Position) -> (Position, Position) {
    let mut end = end;
    let start = if doc.is_text(start.node) {
        let len = doc.node_len(start.node);
        if start.offset > 0 && start.offset < len {
            let right = split_text(doc, start.node, start.offset);
            if end.node == start.node {
                end = Position::new(right, end.offset.saturating_sub(start.offset));
            }
        }
        if start.offset == 0 {
            before(doc, start.node)
        } else {
            after(doc, start.node)
        }
    } else {
        start
    };

    let end = if doc.is_text(end.node) {
        let len = doc.node_len(end.node);
        if end.offset > 0 && end.offset < len {
            split_text(doc, end.node, end.offset);
        }
        if end.offset == 0 {
            before(doc, end.node)
        } else {
            after(doc, end.node)
        }
    } else {
        end
    };
    (start, end)
}

// Leaf nodes lying entirely between two element boundaries.
fn leaves_between(doc: &Document, start: Position, end: Position) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|node| doc.is_text(*node) || doc.children(*node).is_empty())
        .filter(|node| {
            doc.compare_positions(before(doc, *node), start) != Ordering::Less
                && doc.compare_positions(after(doc, *node), end) != Ordering::Greater
        })
        .collect()
}

// Inline siblings around the caret directly under the root, in order.
fn inline_run(doc: &Document, caret: Position) -> Option<Vec<NodeId>> {
    let root = doc.root();
    let anchor = if caret.node == root {
        let children = doc.children(root);
        if children.is_empty() {
            return Some(Vec::new());
        }
        children
            .get(caret.offset)
            .or_else(|| caret.offset.checked_sub(1).and_then(|prev| children.get(prev)))
            .copied()?
    } else {
        doc.closest(caret.node, root, |doc, id| doc.parent(id) == Some(root))?
    };
    if doc.tag(anchor).is_some_and(is_block_tag) {
        return None;
    }

    let is_inline = |node: &NodeId| !doc.tag(*node).is_some_and(is_block_tag);
    let children = doc.children(root);
    let index = doc.index_in_parent(anchor)?;
    let first = children[..index]
        .iter()
        .rposition(|node| !is_inline(node))
        .map_or(0, |blocker| blocker + 1);
    let last = children[index..]
        .iter()
        .position(|node| !is_inline(node))
        .map_or(children.len(), |blocker| index + blocker);
    Some(children[first..last].to_vec())
}
