//! Core domain logic for habitlog.
//! This crate is the single source of truth for habit state invariants.

pub mod calendar;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::grid::{
    current_week_range, habit_month_grid, habit_week_grid, month_days, week_start, Day, MonthDays,
};
pub use calendar::stats::{habit_stats, monthly_rates, HabitStats, MonthlyRate};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::habit::{
    seed_habits, Frequency, Habit, HabitEdit, HabitId, HabitValidationError, NewHabit,
};
pub use repo::habit_repo::{
    decode_habits, encode_habits, HabitRepository, KvHabitRepository, RepoError, RepoResult,
    HABITS_KEY,
};
pub use repo::kv_store::{KeyValueStore, KvError, KvResult, MemoryKvStore};
pub use repo::queued::QueuedKvStore;
pub use repo::sqlite_kv::{SqliteKvStore, KV_SCHEMA_VERSION};
pub use service::habit_store::{HabitStore, ListenerId, LoadOutcome};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
