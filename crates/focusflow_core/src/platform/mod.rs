//! Host collaborators the core depends on: wall clock and id generation.
//!
//! # Invariants
//! - Core logic never reads system time or generates ids directly; it goes
//!   through these traits so tests stay deterministic.

pub mod clock;
pub mod ids;
