//! Journal domain model.
//!
//! # Responsibility
//! - Define stored page/block records.
//! - Provide the in-memory outline arena the carry engines walk.
//!
//! # Invariants
//! - Every block is identified by a stable `BlockId` and owned by one page.
//! - Deletion is represented by soft-delete tombstones in storage.

pub mod block;
pub mod outline;
pub mod page;
pub mod run_state;
