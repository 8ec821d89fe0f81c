//! Cancel-and-reschedule timer for debounced saves.
//!
//! # Invariants
//! - At most one deadline is outstanding.
//! - Scheduling always replaces the previous deadline, never adds a second one.

/// Single cooperative timer driven by the host's clock ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceTimer {
    delay_ms: i64,
    deadline_ms: Option<i64>,
}

impl DebounceTimer {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms,
            deadline_ms: None,
        }
    }

    /// Arms the timer `delay_ms` after `now_ms`.
    ///
    /// Returns `true` when a pending deadline was superseded.
    pub fn schedule(&mut self, now_ms: i64) -> bool {
        self.deadline_ms
            .replace(now_ms.saturating_add(self.delay_ms))
            .is_some()
    }

    /// Disarms the timer. Returns whether a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline_ms.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline_ms(&self) -> Option<i64> {
        self.deadline_ms
    }

    /// Consumes the deadline when it has been reached.
    pub fn fire_if_due(&mut self, now_ms: i64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
