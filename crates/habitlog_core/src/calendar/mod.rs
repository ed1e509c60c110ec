//! Calendar derivations for tracking grids and progress statistics.
//!
//! # Responsibility
//! - Build month/week day cells for rendering.
//! - Derive completion statistics from per-day habit history.
//!
//! # Invariants
//! - Every function here is pure: output depends only on its arguments.
//! - Grid cells are transient view models and are never persisted.

pub mod grid;
pub mod stats;
