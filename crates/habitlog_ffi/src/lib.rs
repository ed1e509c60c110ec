//! Flutter-facing bridge for habitlog core.

pub mod api;
