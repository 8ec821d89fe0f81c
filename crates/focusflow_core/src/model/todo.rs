//! Todo record.
//!
//! # Invariants
//! - `completed` only changes through an explicit toggle.
//! - Reordering is a permutation of the existing list.

use serde::{Deserialize, Serialize};

/// Short text task with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Todo {
    /// Creates an open (not completed) todo.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category_id: Option<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
            category_id,
            created_at,
        }
    }
}
