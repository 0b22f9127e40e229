//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the carry-over run depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`PageNotFound`,
//!   `BlockNotFound`) in addition to DB transport errors.

pub mod journal_repo;
