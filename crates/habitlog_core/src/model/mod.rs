//! Domain model for tracked habits.
//!
//! # Responsibility
//! - Define the persisted habit record and its input/edit shapes.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - Every habit is identified by a non-empty `HabitId`.
//! - Habit names are stored trimmed and never empty.

pub mod habit;
