//! Read-side use cases over the application state.
//!
//! # Responsibility
//! - Keep view-facing queries (filtering, selection) out of the store.

pub mod note_query;
