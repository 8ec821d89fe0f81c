//! Rich-text input controller bound to one note per editing session.
//!
//! # Responsibility
//! - Translate input, key, paste and toolbar events into surface edits.
//! - Push every body change to the store as `update_note(id, {content})`.
//! - Resynchronize the surface from the store only across note switches.
//!
//! # Invariants
//! - Content containing the literal `/todo` trigger is never reported when
//!   the expansion applies.
//! - The internal-change flag belongs to the session, never to the process.
//! - Image decode tasks hold weak session handles; completing one after the
//!   session ended is a no-op.

use crate::editor::command::Command;
use crate::editor::dom::{NodeId, Position};
use crate::editor::edit::has_checkbox;
use crate::editor::export::TextExport;
use crate::editor::font::{clamp_font_size, parse_font_size_input, FONT_SIZE_STEP};
use crate::editor::paste::{image_data_url, image_html, ClipboardItem, PasteError};
use crate::editor::surface::EditableSurface;
use crate::model::note::{Note, NotePatch};
use crate::store::NoteSink;
use log::{debug, info, warn};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

/// Markup of one checkbox line, as inserted by `/todo` and the toolbar.
pub const CHECKBOX_LINE_HTML: &str = r#"<div><input type="checkbox">&nbsp;</div>"#;
pub const TODO_TRIGGER: &str = "/todo";

/// Key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the controller did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Host should run its default handling.
    NotHandled,
    Undo,
    Redo,
    ClearedCheckboxLine,
    ContinuedCheckboxLine,
    OutdentedListItem,
}

impl KeyOutcome {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Self::NotHandled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    NoSession,
    Propagated,
    ExpandedTodo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    NoSession,
    /// A new session started for a different note.
    Switched,
    /// Echo of the controller's own update; skipped once.
    SkippedInternal,
    Unchanged,
    /// Stored content differs but the surface holds edits not yet reported;
    /// the surface is kept.
    KeptLocalEdits,
    Resynced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePasteOutcome {
    Inserted,
    /// The editing session ended before the decode completed.
    Detached,
    Failed(PasteError),
}

/// Result of a paste event.
#[derive(Debug)]
pub struct PasteOutcome {
    pub prevent_default: bool,
    pub tasks: Vec<ImageDecodeTask>,
}

#[derive(Debug)]
struct EditSession {
    note_id: String,
    title: String,
    surface: EditableSurface,
    font_size: u32,
    font_family: String,
    internal_change: bool,
    // Body last loaded from or reported to the store.
    synced_html: String,
}

impl EditSession {
    fn for_note(note: &Note) -> Self {
        let surface = EditableSurface::from_html(&note.content);
        let synced_html = surface.html();
        Self {
            note_id: note.id.clone(),
            title: note.title.clone(),
            surface,
            font_size: note.effective_font_size(),
            font_family: note.effective_font_family().to_string(),
            internal_change: false,
            synced_html,
        }
    }

    fn has_local_edits(&self) -> bool {
        self.surface.html() != self.synced_html
    }

    // Reports the serialized surface as the note body.
    fn propagate(&mut self, sink: &mut dyn NoteSink) {
        self.internal_change = true;
        let content = self.surface.html();
        debug!(
            "event=note_propagate module=editor status=ok content_len={}",
            content.len()
        );
        self.synced_html.clone_from(&content);
        sink.update_note(&self.note_id, NotePatch::content(content));
    }

    // Replaces a trailing `/todo` in the caret's text node with a checkbox line.
    fn expand_todo(&mut self) -> bool {
        if !self.surface.inner_text().ends_with(TODO_TRIGGER) {
            return false;
        }
        let Some(caret) = self.surface.caret() else {
            return false;
        };
        let (remaining, cut_at) = {
            let Some(text) = self.surface.document().text(caret.node) else {
                return false;
            };
            let Some(start) = text.rfind(TODO_TRIGGER) else {
                return false;
            };
            let remaining = format!("{}{}", &text[..start], &text[start + TODO_TRIGGER.len()..]);
            (remaining, text[..start].chars().count())
        };

        self.surface.edit_step(|surface| {
            surface.set_node_text(caret.node, &remaining);
            surface.set_caret(Position::new(caret.node, cut_at));
            surface.insert_html(CHECKBOX_LINE_HTML);
        });
        true
    }
}

/// Pending asynchronous image decode created by a paste.
#[derive(Debug)]
pub struct ImageDecodeTask {
    session: Weak<RefCell<EditSession>>,
    item: ClipboardItem,
}

impl ImageDecodeTask {
    pub fn mime_type(&self) -> &str {
        &self.item.mime_type
    }

    /// Encodes the image and inserts it at the session's current caret.
    pub fn complete(self, sink: &mut dyn NoteSink) -> ImagePasteOutcome {
        let Some(session) = self.session.upgrade() else {
            debug!("event=image_paste module=editor status=skip reason=session_closed");
            return ImagePasteOutcome::Detached;
        };
        let data_url = match image_data_url(&self.item) {
            Ok(url) => url,
            Err(err) => {
                warn!("event=image_paste module=editor status=error error={err}");
                return ImagePasteOutcome::Failed(err);
            }
        };
        let Ok(mut session) = session.try_borrow_mut() else {
            warn!("event=image_paste module=editor status=error error=surface_busy");
            return ImagePasteOutcome::Failed(PasteError::SurfaceBusy);
        };

        if session.surface.caret().is_none() {
            session.surface.move_caret_to_end();
        }
        session.surface.insert_html(&image_html(&data_url));
        session.propagate(sink);
        info!(
            "event=image_paste module=editor status=ok bytes={}",
            data_url.len()
        );
        ImagePasteOutcome::Inserted
    }
}

/// Controller for the note editor.
#[derive(Debug, Default)]
pub struct RichTextController {
    session: Option<Rc<RefCell<EditSession>>>,
}

impl RichTextController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the editor to `note`.
    ///
    /// A different id ends the current session and starts a new one from the
    /// note's content and fonts; the same id is treated as a store echo.
    pub fn switch_note(&mut self, note: &Note) -> SyncOutcome {
        if self.note_id().as_deref() == Some(note.id.as_str()) {
            return self.sync_from_note(note);
        }
        self.session = Some(Rc::new(RefCell::new(EditSession::for_note(note))));
        debug!("event=editor_switch module=editor status=ok");
        SyncOutcome::Switched
    }

    /// Applies a store update for the bound note.
    ///
    /// Skipped once after the controller's own propagation. Otherwise the
    /// surface is replaced when the stored content differs, unless it holds
    /// edits that were not propagated yet.
    pub fn sync_from_note(&mut self, note: &Note) -> SyncOutcome {
        let Some(session) = &self.session else {
            return SyncOutcome::NoSession;
        };
        let mut session = session.borrow_mut();
        if session.note_id != note.id {
            return SyncOutcome::Unchanged;
        }
        session.title = note.title.clone();
        if session.internal_change {
            session.internal_change = false;
            return SyncOutcome::SkippedInternal;
        }
        let stored = EditableSurface::from_html(&note.content).html();
        if session.surface.html() == stored {
            return SyncOutcome::Unchanged;
        }
        if session.has_local_edits() {
            debug!("event=editor_sync module=editor status=skip reason=local_edits");
            return SyncOutcome::KeptLocalEdits;
        }
        session.surface.set_html(&note.content);
        session.synced_html = stored;
        SyncOutcome::Resynced
    }

    /// Ends the session; pending image tasks become no-ops.
    pub fn teardown(&mut self) {
        if self.session.take().is_some() {
            debug!("event=editor_teardown module=editor status=ok");
        }
    }

    pub fn note_id(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.borrow().note_id.clone())
    }

    pub fn is_internal_change(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.borrow().internal_change)
    }

    pub fn surface(&self) -> Option<Ref<'_, EditableSurface>> {
        self.session
            .as_ref()
            .map(|session| Ref::map(session.borrow(), |session| &session.surface))
    }

    /// Mutable surface access for host typing and caret moves.
    pub fn surface_mut(&self) -> Option<RefMut<'_, EditableSurface>> {
        self.session
            .as_ref()
            .map(|session| RefMut::map(session.borrow_mut(), |session| &mut session.surface))
    }

    pub fn font_size(&self) -> Option<u32> {
        self.session.as_ref().map(|session| session.borrow().font_size)
    }

    pub fn font_family(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.borrow().font_family.clone())
    }

    /// Input event: expands `/todo` when it applies, then propagates.
    pub fn handle_input(&mut self, sink: &mut dyn NoteSink) -> InputOutcome {
        let Some(session) = &self.session else {
            return InputOutcome::NoSession;
        };
        let mut session = session.borrow_mut();
        let expanded = session.expand_todo();
        session.propagate(sink);
        if expanded {
            info!("event=todo_expand module=editor status=ok");
            InputOutcome::ExpandedTodo
        } else {
            InputOutcome::Propagated
        }
    }

    /// Toolbar "to-do item": inserts a checkbox line at the caret.
    pub fn insert_todo(&mut self, sink: &mut dyn NoteSink) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let mut session = session.borrow_mut();
        if session.surface.caret().is_none() {
            session.surface.move_caret_to_end();
        }
        session.surface.insert_html(CHECKBOX_LINE_HTML);
        session.propagate(sink);
        true
    }

    /// Toolbar formatting command followed by propagation.
    pub fn exec_command(&mut self, command: &Command, sink: &mut dyn NoteSink) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let mut session = session.borrow_mut();
        let applied = session.surface.exec(command);
        debug!(
            "event=editor_command module=editor status={} command={}",
            if applied { "ok" } else { "skip" },
            command
        );
        session.propagate(sink);
        applied
    }

    pub fn toggle_checkbox(&mut self, node: NodeId, sink: &mut dyn NoteSink) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let mut session = session.borrow_mut();
        if !session.surface.toggle_checkbox(node) {
            return false;
        }
        session.propagate(sink);
        true
    }

    pub fn handle_key_down(&mut self, event: &KeyEvent, sink: &mut dyn NoteSink) -> KeyOutcome {
        let Some(session) = &self.session else {
            return KeyOutcome::NotHandled;
        };
        let mut session = session.borrow_mut();

        if event.has_command_modifier() {
            let outcome = match event.key.to_ascii_lowercase().as_str() {
                "z" if event.shift => Some(KeyOutcome::Redo),
                "z" => Some(KeyOutcome::Undo),
                "y" => Some(KeyOutcome::Redo),
                _ => None,
            };
            if let Some(outcome) = outcome {
                if outcome == KeyOutcome::Undo {
                    session.surface.undo();
                } else {
                    session.surface.redo();
                }
                session.propagate(sink);
                return outcome;
            }
        }

        if event.key != "Enter" {
            return KeyOutcome::NotHandled;
        }
        let outcome = enter_in_line(&mut session.surface);
        if outcome.prevents_default() {
            session.propagate(sink);
        }
        outcome
    }

    /// Paste event: each image item becomes an independent decode task.
    pub fn handle_paste(&mut self, items: Vec<ClipboardItem>) -> PasteOutcome {
        let session = self
            .session
            .as_ref()
            .map_or_else(Weak::new, Rc::downgrade);
        let tasks: Vec<ImageDecodeTask> = items
            .into_iter()
            .filter(ClipboardItem::is_image)
            .map(|item| ImageDecodeTask {
                session: session.clone(),
                item,
            })
            .collect();
        if !tasks.is_empty() {
            debug!(
                "event=image_paste module=editor status=start items={}",
                tasks.len()
            );
        }
        PasteOutcome {
            prevent_default: !tasks.is_empty(),
            tasks,
        }
    }

    /// Sets the font size, clamped to the allowed range.
    pub fn handle_font_size_change(&mut self, requested: i64, sink: &mut dyn NoteSink) -> Option<u32> {
        let session = self.session.as_ref()?;
        let mut session = session.borrow_mut();
        let size = clamp_font_size(requested);
        session.font_size = size;
        sink.update_note(&session.note_id, NotePatch::font_size(size));
        Some(size)
    }

    /// Size typed into the size field; unparsable or zero keeps the current size.
    pub fn handle_font_size_input(&mut self, input: &str, sink: &mut dyn NoteSink) -> Option<u32> {
        let current = self.font_size()?;
        let requested = parse_font_size_input(input)
            .filter(|size| *size != 0)
            .unwrap_or_else(|| i64::from(current));
        self.handle_font_size_change(requested, sink)
    }

    pub fn increase_font_size(&mut self, sink: &mut dyn NoteSink) -> Option<u32> {
        let current = self.font_size()?;
        self.handle_font_size_change(i64::from(current) + i64::from(FONT_SIZE_STEP), sink)
    }

    pub fn decrease_font_size(&mut self, sink: &mut dyn NoteSink) -> Option<u32> {
        let current = self.font_size()?;
        self.handle_font_size_change(i64::from(current) - i64::from(FONT_SIZE_STEP), sink)
    }

    pub fn handle_font_family_change(&mut self, family: &str, sink: &mut dyn NoteSink) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let mut session = session.borrow_mut();
        session.font_family = family.to_string();
        sink.update_note(&session.note_id, NotePatch::font_family(family));
        true
    }

    pub fn rename(&mut self, title: &str, sink: &mut dyn NoteSink) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let mut session = session.borrow_mut();
        session.title = title.to_string();
        sink.update_note(&session.note_id, NotePatch::title(title));
        true
    }

    /// Assigns the note to a category, or clears it with `None`.
    pub fn assign_category(&mut self, category_id: Option<&str>, sink: &mut dyn NoteSink) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let session = session.borrow();
        sink.update_note(
            &session.note_id,
            NotePatch::category(category_id.map(str::to_string)),
        );
        true
    }

    /// Plain-text export of the current surface content.
    pub fn export(&self) -> Option<TextExport> {
        let session = self.session.as_ref()?.borrow();
        Some(TextExport::for_note(
            &session.title,
            &session.surface.inner_text(),
        ))
    }
}

// Enter inside a checkbox line or an empty list item.
fn enter_in_line(surface: &mut EditableSurface) -> KeyOutcome {
    let Some(line) = surface.line_at_caret() else {
        return KeyOutcome::NotHandled;
    };
    let doc = surface.document();
    let label_is_empty = doc.text_content(line).trim().is_empty();
    let is_list_item = doc.has_tag(line, "li");

    if has_checkbox(doc, line) {
        if label_is_empty {
            surface.edit_step(|surface| {
                surface.replace_inner_html(line, "<br>");
                surface.set_caret(Position::new(line, 0));
            });
            return KeyOutcome::ClearedCheckboxLine;
        }
        surface.edit_step(|surface| {
            // Caret sits right after the new checkbox.
            if let Some(next) = surface.insert_html_after(line, CHECKBOX_LINE_HTML) {
                surface.set_caret(Position::new(next, 1));
            }
        });
        return KeyOutcome::ContinuedCheckboxLine;
    }

    if is_list_item && label_is_empty {
        surface.exec(&Command::Outdent);
        return KeyOutcome::OutdentedListItem;
    }
    KeyOutcome::NotHandled
}
