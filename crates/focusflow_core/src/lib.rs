//! Core domain logic for FocusFlow.
//! This crate owns the note/todo state, its persistence, and the rich-text
//! editor controller; hosts only render and forward events.

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod platform;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{StoreConfig, SAVE_DEBOUNCE, STORAGE_KEY};
pub use editor::{
    ClipboardItem, Command, EditableSurface, ImagePasteOutcome, KeyEvent, KeyOutcome,
    RichTextController, TextExport,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::category::Category;
pub use model::data::FocusFlowData;
pub use model::note::{Note, NotePatch};
pub use model::todo::Todo;
pub use platform::clock::{Clock, ManualClock, SystemClock};
pub use platform::ids::{IdGenerator, SequentialIds, UuidIdGenerator};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use service::note_query::{current_note, filter_notes, resolve_category, NoteFilter};
pub use store::{LoadSource, NoteSink, SaveOutcome, Store, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
