//! Unique id generation.

use std::cell::Cell;
use uuid::Uuid;

/// Source of collision-free record ids.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// Random UUID v4 ids, the production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` ids starting at 1.
#[derive(Debug, Default)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let value = self.next.get();
        self.next.set(value + 1);
        format!("{}-{value}", self.prefix)
    }
}
