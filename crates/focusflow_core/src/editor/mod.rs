//! Rich-text note editor.
//!
//! # Responsibility
//! - Model the editable surface (document tree, selection, history).
//! - Implement the input controller that turns editor events into note
//!   updates.
//!
//! # Invariants
//! - The surface is scratch state for one session; the store only receives
//!   serialized snapshots through `NoteSink`.

pub mod command;
pub mod controller;
pub mod dom;
pub mod edit;
pub mod export;
pub mod font;
pub mod history;
pub mod html;
pub mod paste;
pub mod surface;
pub mod text;

pub use command::Command;
pub use controller::{
    ImageDecodeTask, ImagePasteOutcome, InputOutcome, KeyEvent, KeyOutcome, PasteOutcome,
    RichTextController, SyncOutcome, CHECKBOX_LINE_HTML,
};
pub use export::TextExport;
pub use paste::{ClipboardItem, PasteError};
pub use surface::{EditableSurface, Selection};
