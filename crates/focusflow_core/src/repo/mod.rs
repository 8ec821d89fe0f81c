//! Persistence abstractions and implementations.
//!
//! # Responsibility
//! - Define the key-value slot contract the store writes through.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Only `crate::store` writes through these APIs.

pub mod kv_repo;
