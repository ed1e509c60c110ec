//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the habit store and calendar grids to Dart via FRB.
//! - Own exactly one `HabitStore` per opened `HabitApp` context.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutating call returns the post-change collection so the UI can
//!   re-render without a separate read.
//! - Storage writes run on a background writer and never block the caller.

use chrono::{FixedOffset, Local, NaiveDate, SecondsFormat};
use habitlog_core::{
    core_version as core_version_inner, current_week_range,
    default_log_level as default_log_level_inner, habit_month_grid, habit_stats,
    init_logging as init_logging_inner, month_days, monthly_rates, ping as ping_inner, Day,
    Frequency, Habit, HabitEdit, HabitId, HabitStore, KvHabitRepository, LoadOutcome, MonthDays,
    NewHabit, QueuedKvStore, SqliteKvStore,
};
use log::info;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const DB_FILE_NAME: &str = "habitlog.sqlite3";
const DB_PATH_ENV: &str = "HABITLOG_DB_PATH";
const STATS_MONTHS: u32 = 6;
const DATE_FORMAT: &str = "%Y-%m-%d";

type AppStore = HabitStore<KvHabitRepository<QueuedKvStore>>;

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Level the app should pass to `init_logging` when the user picked none.
#[flutter_rust_bridge::frb(sync)]
pub fn default_log_level() -> String {
    default_log_level_inner().to_owned()
}

/// Habit row rendered by list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitItem {
    pub id: String,
    pub name: String,
    pub done: bool,
    /// `Daily|Weekly|Custom` when set.
    pub frequency: Option<String>,
    pub notes: Option<String>,
    pub goal: Option<String>,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub created_at: Option<String>,
}

/// One tracking-grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayItem {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub day: u32,
    /// Three-letter weekday label.
    pub weekday: String,
    pub done: bool,
    pub today: bool,
}

/// Month grid plus scroll hints for horizontal day lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGridResponse {
    pub days: Vec<DayItem>,
    pub today_index: u32,
    pub scroll_index: u32,
}

/// Completion rate of one month, labelled `MM` for chart axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyRateItem {
    pub label: String,
    pub percent: u32,
}

/// Details-view statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitStatsItem {
    pub times_done: u32,
    pub times_missed: u32,
    pub month_percent: u32,
    pub total_percent: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Oldest month first.
    pub monthly: Vec<MonthlyRateItem>,
}

/// Result envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitActionResponse {
    pub ok: bool,
    /// Affected habit id, when one exists.
    pub habit_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
    /// Collection after the call.
    pub habits: Vec<HabitItem>,
}

/// Application-wide habit context. Open once at startup and pass it down.
#[flutter_rust_bridge::frb(opaque)]
pub struct HabitApp {
    store: Mutex<AppStore>,
}

impl HabitApp {
    /// Opens storage and loads the habit collection.
    ///
    /// `db_path` overrides `HABITLOG_DB_PATH`, which overrides the temp-dir
    /// default. Corrupt stored data does not fail opening.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open(db_path: Option<String>) -> Result<HabitApp, String> {
        let path = resolve_db_path(db_path);
        let backend = SqliteKvStore::open(&path)
            .map_err(|err| format!("habit DB open failed: {err}"))?;
        let queued = QueuedKvStore::spawn(backend)
            .map_err(|err| format!("habit writer start failed: {err}"))?;

        let mut store = HabitStore::new(KvHabitRepository::new(queued));
        let outcome = store.load();
        let source = match outcome {
            LoadOutcome::Restored(_) => "storage",
            LoadOutcome::Seeded(_) => "seed",
            LoadOutcome::Recovered => "recovered",
        };
        info!(
            "event=habit_app_open module=ffi status=ok source={source} count={}",
            store.list().len()
        );

        Ok(HabitApp {
            store: Mutex::new(store),
        })
    }

    /// Current habits in insertion order.
    #[flutter_rust_bridge::frb(sync)]
    pub fn list(&self) -> Vec<HabitItem> {
        to_habit_items(self.store().list())
    }

    /// Adds a habit from the add-habit form.
    ///
    /// Blank names and unknown frequencies are rejected with `ok=false`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn add(
        &self,
        name: String,
        frequency: Option<String>,
        notes: Option<String>,
        goal: Option<String>,
    ) -> HabitActionResponse {
        let mut store = self.store();
        let frequency = match parse_frequency(frequency) {
            Ok(frequency) => frequency,
            Err(message) => return HabitActionResponse::failure(message, &store),
        };
        let input = NewHabit {
            name,
            frequency,
            notes,
            goal,
            created_at: None,
        };

        match store.add(input) {
            Ok(id) => HabitActionResponse::success("Habit added.", Some(id), &store),
            Err(err) => HabitActionResponse::failure(format!("add failed: {err}"), &store),
        }
    }

    /// Flips the habit-level done flag. Unknown ids are a no-op.
    #[flutter_rust_bridge::frb(sync)]
    pub fn toggle(&self, id: String) -> HabitActionResponse {
        let mut store = self.store();
        let id = HabitId::new(id);
        if store.toggle(&id) {
            HabitActionResponse::success("Habit toggled.", Some(id), &store)
        } else {
            HabitActionResponse::success("No matching habit.", None, &store)
        }
    }

    /// Deletes a habit. Unknown ids are a no-op.
    #[flutter_rust_bridge::frb(sync)]
    pub fn delete(&self, id: String) -> HabitActionResponse {
        let mut store = self.store();
        let id = HabitId::new(id);
        if store.delete(&id) {
            HabitActionResponse::success("Habit deleted.", Some(id), &store)
        } else {
            HabitActionResponse::success("No matching habit.", None, &store)
        }
    }

    /// Edits descriptive fields; `None` keeps the current value.
    #[flutter_rust_bridge::frb(sync)]
    pub fn edit(
        &self,
        id: String,
        name: Option<String>,
        frequency: Option<String>,
        notes: Option<String>,
        goal: Option<String>,
    ) -> HabitActionResponse {
        let mut store = self.store();
        let frequency = match parse_frequency(frequency) {
            Ok(frequency) => frequency,
            Err(message) => return HabitActionResponse::failure(message, &store),
        };
        let id = HabitId::new(id);
        let edit = HabitEdit {
            name,
            frequency,
            notes,
            goal,
        };

        match store.edit(&id, edit) {
            Ok(true) => HabitActionResponse::success("Habit updated.", Some(id), &store),
            Ok(false) => HabitActionResponse::success("No matching habit.", None, &store),
            Err(err) => HabitActionResponse::failure(format!("edit failed: {err}"), &store),
        }
    }

    /// Flips completion of one `YYYY-MM-DD` day in the habit history.
    #[flutter_rust_bridge::frb(sync)]
    pub fn toggle_day(&self, id: String, date: String) -> HabitActionResponse {
        let mut store = self.store();
        let date = match NaiveDate::parse_from_str(date.trim(), DATE_FORMAT) {
            Ok(date) => date,
            Err(err) => {
                return HabitActionResponse::failure(format!("invalid date `{date}`: {err}"), &store)
            }
        };
        let id = HabitId::new(id);

        match store.toggle_day(&id, date) {
            Some(true) => HabitActionResponse::success("Day completed.", Some(id), &store),
            Some(false) => HabitActionResponse::success("Day cleared.", Some(id), &store),
            None => HabitActionResponse::success("No matching habit.", None, &store),
        }
    }

    /// Month grid of today's month with the habit's completed days marked.
    #[flutter_rust_bridge::frb(sync)]
    pub fn month_grid(&self, id: String) -> Option<MonthGridResponse> {
        self.month_grid_on(&HabitId::new(id), local_today())
    }

    /// Details-view statistics as of today.
    #[flutter_rust_bridge::frb(sync)]
    pub fn stats(&self, id: String) -> Option<HabitStatsItem> {
        let (today, offset) = local_clock();
        self.stats_on(&HabitId::new(id), today, offset)
    }

    /// Waits until every queued write reached storage.
    ///
    /// Returns empty string on success and error message on failure.
    #[flutter_rust_bridge::frb(sync)]
    pub fn flush(&self) -> String {
        match self.store().repository().store().flush() {
            Ok(()) => String::new(),
            Err(err) => format!("flush failed: {err}"),
        }
    }

    fn month_grid_on(&self, id: &HabitId, today: NaiveDate) -> Option<MonthGridResponse> {
        let store = self.store();
        let habit = store.get(id)?;
        Some(to_month_grid(&habit_month_grid(habit, today)))
    }

    fn stats_on(
        &self,
        id: &HabitId,
        today: NaiveDate,
        offset: FixedOffset,
    ) -> Option<HabitStatsItem> {
        let store = self.store();
        let habit = store.get(id)?;
        Some(to_stats_item(habit, today, offset))
    }

    fn store(&self) -> MutexGuard<'_, AppStore> {
        // Store mutations never leave the collection half-updated.
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Days of the current month for the tracker screen.
#[flutter_rust_bridge::frb(sync)]
pub fn month_days_today() -> MonthGridResponse {
    to_month_grid(&month_days(local_today()))
}

/// Monday..Sunday of the current week.
#[flutter_rust_bridge::frb(sync)]
pub fn week_days_today() -> Vec<DayItem> {
    current_week_range(local_today())
        .iter()
        .map(to_day_item)
        .collect()
}

impl HabitActionResponse {
    fn success(message: impl Into<String>, habit_id: Option<HabitId>, store: &AppStore) -> Self {
        Self {
            ok: true,
            habit_id: habit_id.map(|id| id.to_string()),
            message: message.into(),
            habits: to_habit_items(store.list()),
        }
    }

    fn failure(message: impl Into<String>, store: &AppStore) -> Self {
        Self {
            ok: false,
            habit_id: None,
            message: message.into(),
            habits: to_habit_items(store.list()),
        }
    }
}

fn parse_frequency(value: Option<String>) -> Result<Option<Frequency>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Frequency::parse(raw)
            .map(Some)
            .ok_or_else(|| format!("unsupported frequency `{raw}`; expected daily|weekly|custom")),
    }
}

fn resolve_db_path(explicit: Option<String>) -> PathBuf {
    let explicit = explicit.filter(|raw| !raw.trim().is_empty());
    if let Some(raw) = explicit {
        return PathBuf::from(raw.trim());
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Today's date together with the offset it was read in.
fn local_clock() -> (NaiveDate, FixedOffset) {
    let now = Local::now();
    (now.date_naive(), *now.offset())
}

fn to_habit_items(habits: &[Habit]) -> Vec<HabitItem> {
    habits
        .iter()
        .map(|habit| HabitItem {
            id: habit.id.to_string(),
            name: habit.name.clone(),
            done: habit.done,
            frequency: habit.frequency.map(|f| f.as_str().to_string()),
            notes: habit.notes.clone(),
            goal: habit.goal.clone(),
            created_at: habit
                .created_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        })
        .collect()
}

fn to_day_item(day: &Day) -> DayItem {
    DayItem {
        date: day.date.format(DATE_FORMAT).to_string(),
        day: day.day,
        weekday: day.weekday_label().to_string(),
        done: day.done,
        today: day.today,
    }
}

fn to_month_grid(grid: &MonthDays) -> MonthGridResponse {
    MonthGridResponse {
        days: grid.days.iter().map(to_day_item).collect(),
        today_index: u32::try_from(grid.today_index).unwrap_or(0),
        scroll_index: u32::try_from(grid.scroll_index()).unwrap_or(0),
    }
}

fn to_stats_item(habit: &Habit, today: NaiveDate, offset: FixedOffset) -> HabitStatsItem {
    let stats = habit_stats(habit, today, offset);
    HabitStatsItem {
        times_done: stats.times_done,
        times_missed: stats.times_missed,
        month_percent: stats.month_percent,
        total_percent: stats.total_percent,
        current_streak: stats.current_streak,
        longest_streak: stats.longest_streak,
        monthly: monthly_rates(habit, today, offset, STATS_MONTHS)
            .into_iter()
            .map(|rate| MonthlyRateItem {
                label: format!("{:02}", rate.month),
                percent: rate.percent,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, default_log_level, init_logging, month_days_today, ping, week_days_today,
        HabitApp,
    };
    use chrono::{FixedOffset, NaiveDate};
    use habitlog_core::HabitId;
    use std::path::Path;

    fn open_at(path: &Path) -> HabitApp {
        HabitApp::open(Some(path.to_str().unwrap().to_string())).unwrap()
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn default_log_level_is_accepted_by_init_logging() {
        let level = default_log_level();
        assert!(["debug", "info"].contains(&level.as_str()));
        assert!(habitlog_core::LogLevel::parse(&level).is_ok());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn first_open_shows_seed_and_persists_after_first_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.sqlite3");

        let app = open_at(&path);
        assert_eq!(app.list().len(), 3);
        let response = app.add("Meditate".to_string(), Some("daily".to_string()), None, None);
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.habits.len(), 4);
        assert_eq!(response.habits[3].frequency.as_deref(), Some("Daily"));
        drop(app);

        let reopened = open_at(&path);
        let names: Vec<String> = reopened.list().into_iter().map(|h| h.name).collect();
        assert_eq!(names.len(), 4);
        assert_eq!(names[3], "Meditate");
    }

    #[test]
    fn add_rejects_blank_name_and_unknown_frequency() {
        let dir = tempfile::tempdir().unwrap();
        let app = open_at(&dir.path().join("habits.sqlite3"));

        let blank = app.add("  ".to_string(), None, None, None);
        assert!(!blank.ok);
        assert!(blank.message.contains("empty"));

        let hourly = app.add("walk".to_string(), Some("hourly".to_string()), None, None);
        assert!(!hourly.ok);
        assert_eq!(hourly.habits.len(), 3);
    }

    #[test]
    fn toggle_and_delete_round_trip_through_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.sqlite3");
        let app = open_at(&path);

        let toggled = app.toggle("2".to_string());
        assert!(toggled.ok);
        assert!(toggled.habits[1].done);
        let deleted = app.delete("3".to_string());
        assert_eq!(deleted.habit_id.as_deref(), Some("3"));
        let missing = app.delete("3".to_string());
        assert!(missing.ok);
        assert_eq!(missing.habit_id, None);
        assert!(app.flush().is_empty());
        drop(app);

        let reopened = open_at(&path);
        let habits = reopened.list();
        assert_eq!(habits.len(), 2);
        assert!(habits[1].done);
    }

    #[test]
    fn toggle_day_feeds_grid_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let app = open_at(&dir.path().join("habits.sqlite3"));

        let marked = app.toggle_day("1".to_string(), "2025-10-14".to_string());
        assert!(marked.ok, "{}", marked.message);
        let bad = app.toggle_day("1".to_string(), "14/10/2025".to_string());
        assert!(!bad.ok);

        let today = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
        let id = HabitId::new("1");
        let grid = app.month_grid_on(&id, today).unwrap();
        assert_eq!(grid.days.len(), 31);
        assert_eq!(grid.today_index, 14);
        assert_eq!(grid.scroll_index, 13);
        assert!(grid.days[13].done);
        assert!(!grid.days[14].done);

        let utc = FixedOffset::east_opt(0).unwrap();
        let stats = app.stats_on(&id, today, utc).unwrap();
        assert_eq!(stats.times_done, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.monthly.len(), 6);
        assert_eq!(stats.monthly[5].label, "10");
        assert!(app.stats_on(&HabitId::new("missing"), today, utc).is_none());
    }

    #[test]
    fn today_grids_have_single_today_cell() {
        let month = month_days_today();
        assert_eq!(month.days.iter().filter(|d| d.today).count(), 1);
        let week = week_days_today();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].weekday, "Mon");
        assert_eq!(week.iter().filter(|d| d.today).count(), 1);
    }
}
