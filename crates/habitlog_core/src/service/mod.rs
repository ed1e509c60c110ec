//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory habit collection and its persistence protocol.
//! - Keep FFI/UI layers decoupled from storage details.

pub mod habit_store;
