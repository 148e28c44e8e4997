//! Task entity and lifecycle.
//!
//! A [`Task`] is owned by the caller until dispatched; after that the
//! dispatcher is its sole mutator. Status transitions are restricted to the
//! legal graph: pending -> in_progress -> {completed, failed}, plus
//! pending -> blocked while unmet dependencies exist.

mod entities;

pub use entities::{Task, TaskId, TaskPriority, TaskStatus};
