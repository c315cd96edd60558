//! Domain model for the task resource.
//!
//! # Responsibility
//! - Define the task record and its create/update request shapes.
//! - Keep one storage-agnostic shape for every backend.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion removes the record; there are no tombstones.

pub mod task;
