//! Read-side note queries for list and editor views.
//!
//! # Responsibility
//! - Filter notes by category and search text.
//! - Pick the note the editor should show.
//! - Resolve a note's category for display.
//!
//! # Invariants
//! - Queries never mutate state and preserve collection order.
//! - Unknown or dangling category ids resolve to "uncategorized".

use crate::model::category::Category;
use crate::model::data::FocusFlowData;
use crate::model::note::Note;

/// List filter: category first, then case-insensitive text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub category_id: Option<String>,
    pub query: Option<String>,
}

impl NoteFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn matching(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn accepts(&self, note: &Note) -> bool {
        if let Some(category_id) = &self.category_id {
            if note.category_id.as_deref() != Some(category_id.as_str()) {
                return false;
            }
        }
        match self.query.as_deref().filter(|query| !query.is_empty()) {
            Some(query) => {
                let needle = query.to_lowercase();
                note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

/// Notes accepted by `filter`, in stored order.
///
/// The search matches raw body markup as well as visible text.
pub fn filter_notes<'a>(notes: &'a [Note], filter: &NoteFilter) -> Vec<&'a Note> {
    notes.iter().filter(|note| filter.accepts(note)).collect()
}

/// Note the editor shows: the active one if it still exists (even when
/// filtered out), else the first filtered note.
pub fn current_note<'a>(
    data: &'a FocusFlowData,
    filtered: &[&'a Note],
    active_id: Option<&str>,
) -> Option<&'a Note> {
    active_id
        .and_then(|id| data.note(id))
        .or_else(|| filtered.first().copied())
}

pub fn resolve_category<'a>(data: &'a FocusFlowData, note: &Note) -> Option<&'a Category> {
    data.category(note.category_id.as_deref())
}

#[cfg(test)]
mod tests {
    use super::{current_note, filter_notes, resolve_category, NoteFilter};
    use crate::model::data::FocusFlowData;
    use crate::model::note::Note;

    fn sample() -> FocusFlowData {
        let mut data = FocusFlowData::seed(0);
        let mut work = Note::new("n-work", 1);
        work.title = "Sprint Plan".to_string();
        work.content = "<div>ship <s>search</s></div>".to_string();
        work.category_id = Some("cat-work".to_string());
        let mut stray = Note::new("n-stray", 2);
        stray.category_id = Some("cat-deleted".to_string());
        data.notes.push(work);
        data.notes.push(stray);
        data
    }

    #[test]
    fn category_then_query_filtering() {
        let data = sample();
        let work = filter_notes(&data.notes, &NoteFilter::all().in_category("cat-work"));
        assert_eq!(work.len(), 1);

        let hits = filter_notes(&data.notes, &NoteFilter::all().matching("SPRINT"));
        assert_eq!(hits[0].id, "n-work");

        let markup_hit = filter_notes(&data.notes, &NoteFilter::all().matching("<s>"));
        assert_eq!(markup_hit.len(), 1);

        let none = filter_notes(
            &data.notes,
            &NoteFilter::all().in_category("cat-personal").matching("sprint"),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn empty_query_matches_everything() {
        let data = sample();
        let all = filter_notes(&data.notes, &NoteFilter::all().matching(""));
        assert_eq!(all.len(), data.notes.len());
    }

    #[test]
    fn current_note_prefers_active_then_first_filtered() {
        let data = sample();
        let filtered = filter_notes(&data.notes, &NoteFilter::all().in_category("cat-work"));

        let active = current_note(&data, &filtered, Some("welcome-note")).unwrap();
        assert_eq!(active.id, "welcome-note");

        let fallback = current_note(&data, &filtered, Some("missing")).unwrap();
        assert_eq!(fallback.id, "n-work");

        assert!(current_note(&data, &[], None).is_none());
    }

    #[test]
    fn dangling_category_is_uncategorized() {
        let data = sample();
        let stray = data.note("n-stray").unwrap();
        assert!(resolve_category(&data, stray).is_none());
        let work = data.note("n-work").unwrap();
        assert_eq!(resolve_category(&data, work).unwrap().name, "Work");
    }
}
