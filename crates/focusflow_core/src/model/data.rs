//! Root aggregate persisted as one blob, plus the built-in seed dataset.
//!
//! # Invariants
//! - Decoding is all-or-nothing: a malformed blob never yields partial data.
//! - Lookups of unknown category ids resolve to "no category".

use crate::model::category::Category;
use crate::model::note::{Note, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};
use crate::model::todo::Todo;
use serde::{Deserialize, Serialize};

const WELCOME_NOTE_CONTENT: &str = "<div>Start taking <b>bold</b> notes, create <i>italics</i>, or <u>underline</u> important points. FocusFlow autosaves everything locally in your browser.</div>";

/// Entire persisted application state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusFlowData {
    pub notes: Vec<Note>,
    pub todos: Vec<Todo>,
    pub categories: Vec<Category>,
}

impl FocusFlowData {
    /// Built-in dataset used until (or instead of) a stored blob.
    pub fn seed(now_ms: i64) -> Self {
        Self {
            notes: vec![Note {
                id: "welcome-note".to_string(),
                title: "Welcome to FocusFlow!".to_string(),
                content: WELCOME_NOTE_CONTENT.to_string(),
                category_id: None,
                font_size: Some(DEFAULT_FONT_SIZE),
                font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
                created_at: now_ms,
                updated_at: now_ms,
            }],
            todos: vec![Todo::new(
                "first-todo",
                "Explore FocusFlow features",
                None,
                now_ms,
            )],
            categories: vec![
                Category::new("cat-personal", "Personal", "#64B5F6"),
                Category::new("cat-work", "Work", "#81C784"),
            ],
        }
    }

    /// Decodes a stored blob.
    pub fn from_json(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    /// Encodes the full state for a whole-blob overwrite.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn todo(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Resolves a category reference; dangling ids resolve to `None`.
    pub fn category(&self, id: Option<&str>) -> Option<&Category> {
        let id = id?;
        self.categories.iter().find(|category| category.id == id)
    }
}
