//! Editable rich-text surface: document, selection and edit history.
//!
//! # Responsibility
//! - Own the scratch copy of a note body during an editing session.
//! - Expose the operations a host binding drives (typing, commands, caret).
//! - Record one undo step per edit, grouping nested edits.
//!
//! # Invariants
//! - The selection, when present, points at attached nodes with in-range offsets.
//! - Edits that leave the serialized content unchanged record no undo step.
//! - `set_html` replaces content wholesale and clears history.

use crate::editor::command::Command;
use crate::editor::dom::{Document, NodeId, Position};
use crate::editor::edit::{self, caret_after, is_checkbox, line_of};
use crate::editor::history::{History, Snapshot};
use crate::editor::html::{inner_html, parse_fragment, set_inner_html};
use crate::editor::text::inner_text;
use std::cmp::Ordering;

/// Anchor/focus pair; collapsed when both are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(at: Position) -> Self {
        Self::new(at, at)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// `(start, end)` in document order.
    pub fn ordered(&self, doc: &Document) -> (Position, Position) {
        match doc.compare_positions(self.anchor, self.focus) {
            Ordering::Greater => (self.focus, self.anchor),
            _ => (self.anchor, self.focus),
        }
    }
}

#[derive(Debug, Default)]
pub struct EditableSurface {
    doc: Document,
    selection: Option<Selection>,
    history: History,
    open_step: Option<Snapshot>,
}

impl EditableSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_html(html: &str) -> Self {
        let mut surface = Self::new();
        surface.set_html(html);
        surface
    }

    /// Serialized content, like `innerHTML`.
    pub fn html(&self) -> String {
        inner_html(&self.doc, self.doc.root())
    }

    /// Plain-text rendering, like `innerText`.
    pub fn inner_text(&self) -> String {
        inner_text(&self.doc, self.doc.root())
    }

    /// Replaces the content; drops selection and history.
    pub fn set_html(&mut self, html: &str) {
        self.doc = Document::new();
        let root = self.doc.root();
        set_inner_html(&mut self.doc, root, html);
        self.selection = None;
        self.history.clear();
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn root(&self) -> NodeId {
        self.doc.root()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Focus end of the selection.
    pub fn caret(&self) -> Option<Position> {
        self.selection.map(|selection| selection.focus)
    }

    pub fn set_caret(&mut self, at: Position) -> bool {
        self.set_selection(at, at)
    }

    pub fn set_selection(&mut self, anchor: Position, focus: Position) -> bool {
        if !self.is_valid(anchor) || !self.is_valid(focus) {
            return false;
        }
        self.selection = Some(Selection::new(anchor, focus));
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Places a collapsed caret after the last content.
    pub fn move_caret_to_end(&mut self) {
        let root = self.doc.root();
        self.selection = Some(Selection::collapsed(caret_after(&self.doc, root)));
    }

    /// Line (`div`/`p`/`li`) holding the caret.
    pub fn line_at_caret(&self) -> Option<NodeId> {
        line_of(&self.doc, self.caret()?.node)
    }

    /// Types `text` at the caret, replacing any selected range.
    pub fn insert_text(&mut self, text: &str) -> bool {
        self.edit_step(|surface| edit::insert_text(&mut surface.doc, &mut surface.selection, text))
    }

    /// Inserts markup at the caret, like `insertHTML`.
    pub fn insert_html(&mut self, html: &str) -> bool {
        self.edit_step(|surface| {
            edit::insert_fragment(&mut surface.doc, &mut surface.selection, html)
        })
    }

    pub fn delete_selection(&mut self) -> bool {
        self.edit_step(|surface| edit::delete_selection(&mut surface.doc, &mut surface.selection))
    }

    /// Runs a formatting command. Returns whether anything changed.
    pub fn exec(&mut self, command: &Command) -> bool {
        if let Some(tags) = command.inline_tags() {
            return self.edit_step(|surface| {
                edit::toggle_inline(&mut surface.doc, &mut surface.selection, tags)
            });
        }
        match command {
            Command::InsertUnorderedList => self.edit_step(|surface| {
                edit::toggle_list(&mut surface.doc, &mut surface.selection, "ul")
            }),
            Command::InsertOrderedList => self.edit_step(|surface| {
                edit::toggle_list(&mut surface.doc, &mut surface.selection, "ol")
            }),
            Command::Outdent => {
                self.edit_step(|surface| edit::outdent(&mut surface.doc, &mut surface.selection))
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::InsertHtml(html) => self.insert_html(html),
            Command::Bold | Command::Italic | Command::Underline => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replaces the text of a text node.
    pub fn set_node_text(&mut self, node: NodeId, text: &str) -> bool {
        if !self.doc.is_attached(node) || !self.doc.is_text(node) {
            return false;
        }
        self.edit_step(|surface| {
            surface.doc.set_text(node, text);
            surface.clamp_selection();
            true
        })
    }

    /// Replaces the children of an attached element with parsed `html`.
    pub fn replace_inner_html(&mut self, node: NodeId, html: &str) -> bool {
        if !self.doc.is_attached(node) || self.doc.is_text(node) {
            return false;
        }
        self.edit_step(|surface| {
            set_inner_html(&mut surface.doc, node, html);
            surface.clamp_selection();
            true
        })
    }

    /// Inserts parsed `html` right after `reference`; returns the first new node.
    pub fn insert_html_after(&mut self, reference: NodeId, html: &str) -> Option<NodeId> {
        if reference == self.doc.root() || !self.doc.is_attached(reference) {
            return None;
        }
        self.edit_step(|surface| {
            let nodes = parse_fragment(&mut surface.doc, html);
            let mut anchor = reference;
            for node in &nodes {
                surface.doc.insert_after(anchor, *node);
                anchor = *node;
            }
            nodes.first().copied()
        })
    }

    /// Flips the persisted `checked` state of a checkbox in the body.
    pub fn toggle_checkbox(&mut self, node: NodeId) -> bool {
        if !self.doc.is_attached(node) || !is_checkbox(&self.doc, node) {
            return false;
        }
        self.edit_step(|surface| {
            if surface.doc.attr(node, "checked").is_some() {
                surface.doc.remove_attr(node, "checked");
            } else {
                surface.doc.set_attr(node, "checked", "checked");
            }
            true
        })
    }

    /// Runs `edit` as a single undo step. Nested calls join the outer step.
    pub fn edit_step<R>(&mut self, edit: impl FnOnce(&mut Self) -> R) -> R {
        let outermost = self.open_step.is_none();
        if outermost {
            self.open_step = Some(self.snapshot());
        }
        let result = edit(self);
        if outermost {
            if let Some(before) = self.open_step.take() {
                if inner_html(&before.doc, before.doc.root()) != self.html() {
                    self.history.record(before);
                }
            }
        }
        result
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            doc: self.doc.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.doc = snapshot.doc;
        self.selection = snapshot.selection;
        self.clamp_selection();
    }

    fn is_valid(&self, at: Position) -> bool {
        self.doc.is_attached(at.node) && at.offset <= self.doc.node_len(at.node)
    }

    // Drops or clamps a selection that an edit invalidated.
    fn clamp_selection(&mut self) {
        let Some(selection) = self.selection else {
            return;
        };
        let clamp = |doc: &Document, at: Position| {
            doc.is_attached(at.node)
                .then(|| Position::new(at.node, at.offset.min(doc.node_len(at.node))))
        };
        self.selection = match (clamp(&self.doc, selection.anchor), clamp(&self.doc, selection.focus)) {
            (Some(anchor), Some(focus)) => Some(Selection::new(anchor, focus)),
            _ => None,
        };
    }
}
