//! Persistence collaborators and the habit collection codec.
//!
//! # Responsibility
//! - Define the key-value contract the habit store persists through.
//! - Provide in-memory, SQLite and queued (background) implementations.
//! - Encode/decode the habit collection stored under one fixed key.
//!
//! # Invariants
//! - The collection is always written whole; there are no partial updates.
//! - Reads reject payloads that are not JSON arrays; individual records are
//!   repaired or skipped so one bad entry never hides the rest.

pub mod habit_repo;
pub mod kv_store;
pub mod queued;
pub mod sqlite_kv;
