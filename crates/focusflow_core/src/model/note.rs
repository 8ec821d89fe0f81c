//! Note record and partial-update patch.
//!
//! # Responsibility
//! - Define the titled rich-text document shape.
//! - Provide shallow-merge semantics for partial updates.
//!
//! # Invariants
//! - `id` is stable for the note lifetime and never patched.
//! - `content` is an opaque serialized HTML fragment; the model never parses it.

use serde::{Deserialize, Serialize};

/// Font size applied to notes that have none stored.
pub const DEFAULT_FONT_SIZE: u32 = 20;
/// Font family applied to notes that have none stored.
pub const DEFAULT_FONT_FAMILY: &str = "var(--font-body)";
/// Title given to freshly created notes.
pub const NEW_NOTE_TITLE: &str = "New Note";
/// Title shown for notes whose title is empty.
pub const UNTITLED_NOTE_TITLE: &str = "Untitled Note";

/// Titled rich-text document with font preferences and category association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Serialized HTML body.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every update.
    pub updated_at: i64,
}

impl Note {
    /// Creates an empty note with default title and font settings.
    pub fn new(id: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: id.into(),
            title: NEW_NOTE_TITLE.to_string(),
            content: String::new(),
            category_id: None,
            font_size: Some(DEFAULT_FONT_SIZE),
            font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Title for display and export; falls back to `Untitled Note`.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED_NOTE_TITLE
        } else {
            self.title.as_str()
        }
    }

    pub fn effective_font_size(&self) -> u32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn effective_font_family(&self) -> &str {
        self.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY)
    }

    /// Returns a copy with `patch` merged in and `updated_at` set to `now_ms`.
    pub fn merged(&self, patch: &NotePatch, now_ms: i64) -> Self {
        let mut next = self.clone();
        patch.apply_to(&mut next);
        next.updated_at = now_ms;
        next
    }
}

/// Partial note update. `None` fields are left untouched.
///
/// `category_id` is doubly optional so callers can clear the association
/// (`Some(None)`) as well as set it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Option<String>>,
    pub font_size: Option<u32>,
    pub font_family: Option<String>,
}

impl NotePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn category(category_id: Option<String>) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn font_size(size: u32) -> Self {
        Self {
            font_size: Some(size),
            ..Self::default()
        }
    }

    pub fn font_family(family: impl Into<String>) -> Self {
        Self {
            font_family: Some(family.into()),
            ..Self::default()
        }
    }

    /// Names of the fields this patch sets, for diagnostics.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.content.is_some() {
            fields.push("content");
        }
        if self.category_id.is_some() {
            fields.push("categoryId");
        }
        if self.font_size.is_some() {
            fields.push("fontSize");
        }
        if self.font_family.is_some() {
            fields.push("fontFamily");
        }
        fields
    }

    fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(category_id) = &self.category_id {
            note.category_id = category_id.clone();
        }
        if let Some(size) = self.font_size {
            note.font_size = Some(size);
        }
        if let Some(family) = &self.font_family {
            note.font_family = Some(family.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NotePatch, UNTITLED_NOTE_TITLE};

    #[test]
    fn merged_changes_only_patched_fields() {
        let mut note = Note::new("n1", 10);
        note.content = "<div>body</div>".to_string();
        note.category_id = Some("cat-work".to_string());

        let next = note.merged(&NotePatch::title("Renamed"), 99);
        assert_eq!(next.title, "Renamed");
        assert_eq!(next.updated_at, 99);
        assert_eq!(next.content, note.content);
        assert_eq!(next.category_id, note.category_id);
        assert_eq!(next.created_at, 10);
    }

    #[test]
    fn category_patch_can_clear_association() {
        let mut note = Note::new("n1", 0);
        note.category_id = Some("cat-work".to_string());
        let next = note.merged(&NotePatch::category(None), 1);
        assert_eq!(next.category_id, None);
    }

    #[test]
    fn display_title_falls_back_for_empty_title() {
        let mut note = Note::new("n1", 0);
        note.title.clear();
        assert_eq!(note.display_title(), UNTITLED_NOTE_TITLE);
    }

    #[test]
    fn serializes_with_camel_case_and_omits_absent_optionals() {
        let mut note = Note::new("n1", 5);
        note.font_family = None;
        let json = serde_json::to_string(&note).expect("note should serialize");
        assert!(json.contains("\"fontSize\":20"));
        assert!(json.contains("\"createdAt\":5"));
        assert!(!json.contains("categoryId"));
        assert!(!json.contains("fontFamily"));
    }
}
