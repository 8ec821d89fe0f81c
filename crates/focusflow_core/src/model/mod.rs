//! Domain model for notes, todos and categories.
//!
//! # Responsibility
//! - Define the records owned by the store and persisted as one blob.
//! - Keep the persisted field names stable (`camelCase` JSON).
//!
//! # Invariants
//! - Every record is identified by a stable string id.
//! - `FocusFlowData` is loaded and saved as a single unit.
//!
//! # See also
//! - `crate::store` for the only mutation path.

pub mod category;
pub mod data;
pub mod note;
pub mod todo;
