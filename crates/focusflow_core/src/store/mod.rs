//! Canonical application state with debounced write-through persistence.
//!
//! # Responsibility
//! - Own `FocusFlowData` and expose every mutation of it.
//! - Load the persisted blob once and fall back to the seed dataset.
//! - Coalesce bursts of changes into one full-state write.
//!
//! # Invariants
//! - No write happens before `load()` completed.
//! - A write always serializes the state at fire time, never a captured copy.
//! - Mutations on unknown ids are silent no-ops.
//! - Snapshots handed out via `snapshot()` never observe later mutations.
//! - Dropping the store cancels the pending save without writing.

pub mod debounce;

use crate::config::StoreConfig;
use crate::model::category::Category;
use crate::model::data::FocusFlowData;
use crate::model::note::{Note, NotePatch};
use crate::model::todo::Todo;
use crate::platform::clock::{Clock, SystemClock};
use crate::platform::ids::{IdGenerator, UuidIdGenerator};
use crate::repo::kv_repo::{KeyValueStore, StorageError};
use debounce::DebounceTimer;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error.
#[derive(Debug)]
pub enum StoreError {
    /// Reorder input is not a permutation of the current todo ids.
    InvalidReorder(String),
    /// State could not be encoded for persistence.
    Encode(serde_json::Error),
    /// Key-value slot rejected the write.
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReorder(message) => write!(f, "invalid todo reorder: {message}"),
            Self::Encode(err) => write!(f, "failed to encode state: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidReorder(_) => None,
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Where the state came from during `load()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the stored blob.
    Stored,
    /// No blob was stored; seed (or pre-load state) kept.
    Seed,
    /// A blob existed but could not be decoded or read; seed kept.
    SeedAfterError,
}

/// Result of driving the save timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing scheduled.
    Idle,
    /// A save is scheduled but not yet due.
    Waiting,
    /// Full state written.
    Saved,
    /// Write attempted and failed; see `last_save_error()`.
    Failed,
}

/// Callback surface the editor uses to report note changes.
pub trait NoteSink {
    fn update_note(&mut self, id: &str, patch: NotePatch);
}

/// Single-writer owner of the application state.
pub struct Store<S: KeyValueStore> {
    storage: S,
    config: StoreConfig,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    data: Arc<FocusFlowData>,
    load_source: Option<LoadSource>,
    revision: u64,
    save_timer: DebounceTimer,
    last_save_error: Option<StoreError>,
}

impl<S: KeyValueStore> Store<S> {
    /// Creates a store with the system clock, UUID ids and default config.
    pub fn new(storage: S) -> Self {
        Self::with_parts(
            storage,
            StoreConfig::default(),
            Box::new(SystemClock),
            Box::new(UuidIdGenerator),
        )
    }

    /// Creates a store from explicit collaborators. State starts as the seed.
    pub fn with_parts(
        storage: S,
        config: StoreConfig,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        let seed = FocusFlowData::seed(clock.now_ms());
        let save_timer = DebounceTimer::new(config.save_debounce_ms());
        Self {
            storage,
            config,
            clock,
            ids,
            data: Arc::new(seed),
            load_source: None,
            revision: 0,
            save_timer,
            last_save_error: None,
        }
    }

    /// Reads the persisted blob once and enables saving.
    ///
    /// Decode and read failures are logged and recovered by keeping the
    /// seed dataset; they never surface as errors. Later calls return the
    /// first result without touching storage.
    pub fn load(&mut self) -> LoadSource {
        if let Some(source) = self.load_source {
            debug!("event=store_load module=store status=skip reason=already_loaded");
            return source;
        }

        let source = match self.storage.get(&self.config.storage_key) {
            Ok(Some(blob)) => match FocusFlowData::from_json(&blob) {
                Ok(data) => {
                    self.data = Arc::new(data);
                    LoadSource::Stored
                }
                Err(err) => {
                    error!(
                        "event=store_load module=store status=error error_code=decode_failed blob_len={} error={}",
                        blob.len(),
                        err
                    );
                    LoadSource::SeedAfterError
                }
            },
            Ok(None) => LoadSource::Seed,
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=read_failed error={}",
                    err
                );
                LoadSource::SeedAfterError
            }
        };

        self.load_source = Some(source);
        self.revision += 1;
        self.schedule_save();
        info!(
            "event=store_load module=store status=ok source={:?} notes={} todos={} categories={}",
            source,
            self.data.notes.len(),
            self.data.todos.len(),
            self.data.categories.len()
        );
        source
    }

    pub fn is_loaded(&self) -> bool {
        self.load_source.is_some()
    }

    /// Read-only view of the current state.
    pub fn data(&self) -> &FocusFlowData {
        &self.data
    }

    /// Shared immutable snapshot; unaffected by later mutations.
    pub fn snapshot(&self) -> Arc<FocusFlowData> {
        Arc::clone(&self.data)
    }

    /// Monotonic counter bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_pending_save(&self) -> bool {
        self.save_timer.is_pending()
    }

    /// Epoch millisecond deadline of the pending save, if any.
    pub fn next_save_due_ms(&self) -> Option<i64> {
        self.save_timer.deadline_ms()
    }

    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    /// Timer tick from the host event loop; writes when the deadline passed.
    pub fn tick(&mut self) -> SaveOutcome {
        if !self.save_timer.is_pending() {
            return SaveOutcome::Idle;
        }
        if !self.save_timer.fire_if_due(self.clock.now_ms()) {
            return SaveOutcome::Waiting;
        }
        self.write_now()
    }

    /// Writes a pending save immediately instead of waiting for the timer.
    pub fn flush(&mut self) -> SaveOutcome {
        if !self.save_timer.cancel() {
            return SaveOutcome::Idle;
        }
        self.write_now()
    }

    /// Prepends a new empty note and returns its id.
    pub fn add_note(&mut self) -> String {
        let note = Note::new(self.ids.next_id(), self.clock.now_ms());
        let id = note.id.clone();
        self.commit("note_add", |data| data.notes.insert(0, note));
        id
    }

    /// Adds a note and assigns it to `category_id` when one is active.
    pub fn add_note_in_category(&mut self, category_id: Option<&str>) -> String {
        let id = self.add_note();
        if let Some(category_id) = category_id {
            self.update_note(&id, NotePatch::category(Some(category_id.to_string())));
        }
        id
    }

    /// Shallow-merges `patch` into the note and refreshes `updated_at`.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown.
    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> bool {
        let Some(index) = self.data.notes.iter().position(|note| note.id == id) else {
            debug!("event=note_update module=store status=skip reason=not_found");
            return false;
        };
        let now = self.clock.now_ms();
        debug!(
            "event=note_update module=store status=ok fields={}",
            patch.field_names().join(",")
        );
        self.commit("note_update", |data| {
            let merged = data.notes[index].merged(&patch, now);
            data.notes[index] = merged;
        });
        true
    }

    /// Removes the note; unknown ids are a no-op.
    pub fn delete_note(&mut self, id: &str) -> bool {
        if self.data.note(id).is_none() {
            return false;
        }
        self.commit("note_delete", |data| data.notes.retain(|note| note.id != id));
        true
    }

    /// Prepends an open todo and returns its id.
    pub fn add_todo(&mut self, text: impl Into<String>, category_id: Option<String>) -> String {
        let todo = Todo::new(self.ids.next_id(), text, category_id, self.clock.now_ms());
        let id = todo.id.clone();
        self.commit("todo_add", |data| data.todos.insert(0, todo));
        id
    }

    /// Flips `completed`; unknown ids are a no-op.
    pub fn toggle_todo(&mut self, id: &str) -> bool {
        let Some(index) = self.data.todos.iter().position(|todo| todo.id == id) else {
            return false;
        };
        self.commit("todo_toggle", |data| {
            data.todos[index].completed = !data.todos[index].completed;
        });
        true
    }

    pub fn delete_todo(&mut self, id: &str) -> bool {
        if self.data.todo(id).is_none() {
            return false;
        }
        self.commit("todo_delete", |data| data.todos.retain(|todo| todo.id != id));
        true
    }

    /// Replaces the todo list wholesale. The caller guarantees a permutation.
    pub fn reorder_todos(&mut self, new_order: Vec<Todo>) {
        self.commit("todo_reorder", |data| data.todos = new_order);
    }

    /// Reorders todos by id, rejecting anything that is not a permutation.
    pub fn reorder_todos_by_id(&mut self, ids: &[String]) -> StoreResult<()> {
        let current: HashSet<&str> = self.data.todos.iter().map(|todo| todo.id.as_str()).collect();
        let requested: HashSet<&str> = ids.iter().map(String::as_str).collect();
        if ids.len() != self.data.todos.len() || requested.len() != ids.len() {
            return Err(StoreError::InvalidReorder(format!(
                "expected {} distinct ids, got {} ({} distinct)",
                self.data.todos.len(),
                ids.len(),
                requested.len()
            )));
        }
        if let Some(unknown) = requested.difference(&current).next() {
            return Err(StoreError::InvalidReorder(format!("unknown todo id `{unknown}`")));
        }

        let reordered = ids
            .iter()
            .filter_map(|id| self.data.todo(id).cloned())
            .collect();
        self.reorder_todos(reordered);
        Ok(())
    }

    /// Appends a category and returns its id.
    pub fn add_category(&mut self, name: impl Into<String>, color: impl Into<String>) -> String {
        let category = Category::new(self.ids.next_id(), name, color);
        let id = category.id.clone();
        self.commit("category_add", |data| data.categories.push(category));
        id
    }

    fn commit(&mut self, event: &'static str, apply: impl FnOnce(&mut FocusFlowData)) {
        apply(Arc::make_mut(&mut self.data));
        self.revision += 1;
        debug!(
            "event={} module=store status=ok revision={}",
            event, self.revision
        );
        self.schedule_save();
    }

    fn schedule_save(&mut self) {
        if !self.is_loaded() {
            return;
        }
        if self.save_timer.schedule(self.clock.now_ms()) {
            debug!("event=store_save module=store status=rescheduled");
        }
    }

    fn write_now(&mut self) -> SaveOutcome {
        match self.try_write() {
            Ok(bytes) => {
                self.last_save_error = None;
                info!(
                    "event=store_save module=store status=ok revision={} bytes={}",
                    self.revision, bytes
                );
                SaveOutcome::Saved
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error revision={} error={}",
                    self.revision, err
                );
                self.last_save_error = Some(err);
                SaveOutcome::Failed
            }
        }
    }

    fn try_write(&mut self) -> StoreResult<usize> {
        let blob = self.data.to_json()?;
        self.storage.set(&self.config.storage_key, &blob)?;
        Ok(blob.len())
    }
}

impl<S: KeyValueStore> NoteSink for Store<S> {
    fn update_note(&mut self, id: &str, patch: NotePatch) {
        Store::update_note(self, id, patch);
    }
}

impl<S: KeyValueStore> Drop for Store<S> {
    fn drop(&mut self) {
        if self.save_timer.cancel() {
            warn!(
                "event=store_teardown module=store status=ok pending_save=cancelled revision={}",
                self.revision
            );
        }
    }
}
