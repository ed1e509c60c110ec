//! Progress statistics derived from per-day completion history.
//!
//! # Invariants
//! - Only completions inside the tracked window count; future days never do.
//! - Percentages are integers in `0..=100`, rounded half up.
//! - `today` and the creation day are read in the same `offset`.

use crate::model::habit::Habit;
use chrono::{Datelike, Days, FixedOffset, Months, NaiveDate};

/// Summary shown on a habit details view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HabitStats {
    pub times_done: u32,
    pub times_missed: u32,
    pub month_percent: u32,
    pub total_percent: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Completion rate of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyRate {
    pub year: i32,
    pub month: u32,
    pub tracked_days: u32,
    pub completed_days: u32,
    pub percent: u32,
}

/// First tracked day: creation date or earliest past completion, whichever
/// comes first. Falls back to `today` when neither exists.
pub fn tracking_start(habit: &Habit, today: NaiveDate, offset: FixedOffset) -> NaiveDate {
    let first_completion = habit
        .completions
        .range(..=today)
        .next()
        .copied();

    match (habit.created_on(offset), first_completion) {
        (Some(created), Some(completed)) => created.min(completed),
        (Some(created), None) => created,
        (None, Some(completed)) => completed,
        (None, None) => today,
    }
}

/// Computes the details-view summary for `habit` as of `today`, where
/// `today` is the local date at `offset`.
pub fn habit_stats(habit: &Habit, today: NaiveDate, offset: FixedOffset) -> HabitStats {
    let start = tracking_start(habit, today, offset);
    let tracked = span_days(start, today);
    let done = completed_between(habit, start, today);

    let month_first = first_of_month(today);
    let month_start = start.max(month_first);
    let month_tracked = span_days(month_start, today);
    let month_done = completed_between(habit, month_start, today);

    HabitStats {
        times_done: done,
        times_missed: tracked.saturating_sub(done),
        month_percent: percent(month_done, month_tracked),
        total_percent: percent(done, tracked),
        current_streak: current_streak(habit, today),
        longest_streak: longest_streak(habit, today),
    }
}

/// Completion rate for the last `months` calendar months ending with the
/// month of `today`, oldest first.
pub fn monthly_rates(
    habit: &Habit,
    today: NaiveDate,
    offset: FixedOffset,
    months: u32,
) -> Vec<MonthlyRate> {
    let start = tracking_start(habit, today, offset);
    let current_first = first_of_month(today);

    (0..months)
        .rev()
        .filter_map(|back| {
            let first = current_first.checked_sub_months(Months::new(back))?;
            let last = first
                .checked_add_months(Months::new(1))?
                .pred_opt()?
                .min(today);
            let from = first.max(start);
            let tracked = span_days(from, last);
            let completed = if tracked == 0 {
                0
            } else {
                completed_between(habit, from, last)
            };
            Some(MonthlyRate {
                year: first.year(),
                month: first.month(),
                tracked_days: tracked,
                completed_days: completed,
                percent: percent(completed, tracked),
            })
        })
        .collect()
}

/// Consecutive completed days ending today, or ending yesterday while today
/// is still open.
pub fn current_streak(habit: &Habit, today: NaiveDate) -> u32 {
    let anchor = if habit.is_completed_on(today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    let mut cursor = anchor;
    while let Some(day) = cursor.filter(|day| habit.is_completed_on(*day)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Longest run of consecutive completed days up to `today`.
pub fn longest_streak(habit: &Habit, today: NaiveDate) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in habit.completions.range(..=today) {
        run = match previous.and_then(|prev| prev.succ_opt()) {
            Some(expected) if expected == *day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }
    longest
}

fn completed_between(habit: &Habit, from: NaiveDate, to: NaiveDate) -> u32 {
    if from > to {
        return 0;
    }
    let count = habit.completions.range(from..=to).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn span_days(from: NaiveDate, to: NaiveDate) -> u32 {
    if from > to {
        return 0;
    }
    let days = (to - from).num_days() + 1;
    u32::try_from(days).unwrap_or(u32::MAX)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (u64::from(part) * 100 + u64::from(whole) / 2) / u64::from(whole);
    u32::try_from(rounded.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::{habit_stats, longest_streak, monthly_rates, percent, tracking_start};
    use crate::model::habit::{Habit, HabitId, NewHabit};
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit_created(y: i32, m: u32, d: u32) -> Habit {
        let created = Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap();
        Habit::create(HabitId::new("h"), NewHabit::named("read"), created).unwrap()
    }

    #[test]
    fn percent_rounds_half_up_and_guards_zero() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn stats_count_done_and_missed_inside_window() {
        let mut habit = habit_created(2025, 10, 1);
        for day in [1, 2, 3, 10, 14, 15] {
            habit.toggle_completion(date(2025, 10, day));
        }
        // Future completions are ignored.
        habit.toggle_completion(date(2025, 10, 20));

        let stats = habit_stats(&habit, date(2025, 10, 15), utc());
        assert_eq!(stats.times_done, 6);
        assert_eq!(stats.times_missed, 9);
        assert_eq!(stats.total_percent, 40);
        assert_eq!(stats.month_percent, 40);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn month_percent_only_counts_current_month() {
        let mut habit = habit_created(2025, 9, 21);
        for day in 21..=30 {
            habit.toggle_completion(date(2025, 9, day));
        }
        habit.toggle_completion(date(2025, 10, 1));

        let stats = habit_stats(&habit, date(2025, 10, 4), utc());
        assert_eq!(stats.times_done, 11);
        assert_eq!(stats.month_percent, 25);
        assert_eq!(stats.total_percent, 79);
    }

    #[test]
    fn current_streak_tolerates_open_today() {
        let mut habit = habit_created(2025, 10, 1);
        habit.toggle_completion(date(2025, 10, 13));
        habit.toggle_completion(date(2025, 10, 14));

        assert_eq!(habit_stats(&habit, date(2025, 10, 15), utc()).current_streak, 2);
        assert_eq!(habit_stats(&habit, date(2025, 10, 16), utc()).current_streak, 0);
    }

    #[test]
    fn tracking_start_uses_earlier_completion_when_created_at_missing() {
        let mut habit = habit_created(2025, 10, 10);
        habit.created_at = None;
        habit.toggle_completion(date(2025, 10, 12));

        assert_eq!(tracking_start(&habit, date(2025, 10, 15), utc()), date(2025, 10, 12));
        habit.completions.clear();
        assert_eq!(tracking_start(&habit, date(2025, 10, 15), utc()), date(2025, 10, 15));
    }

    #[test]
    fn longest_streak_resets_on_gaps() {
        let mut habit = habit_created(2025, 1, 1);
        for (m, d) in [(1, 30), (1, 31), (2, 1), (2, 3)] {
            habit.toggle_completion(date(2025, m, d));
        }
        assert_eq!(longest_streak(&habit, date(2025, 2, 10)), 3);
    }

    #[test]
    fn monthly_rates_are_oldest_first_and_clip_to_window() {
        let mut habit = habit_created(2025, 9, 16);
        for day in 16..=30 {
            habit.toggle_completion(date(2025, 9, day));
        }
        habit.toggle_completion(date(2025, 10, 1));

        let rates = monthly_rates(&habit, date(2025, 10, 2), utc(), 3);
        assert_eq!(rates.len(), 3);
        assert_eq!((rates[0].year, rates[0].month), (2025, 8));
        assert_eq!(rates[0].tracked_days, 0);
        assert_eq!(rates[0].percent, 0);
        assert_eq!(rates[1].tracked_days, 15);
        assert_eq!(rates[1].percent, 100);
        assert_eq!(rates[2].tracked_days, 2);
        assert_eq!(rates[2].completed_days, 1);
        assert_eq!(rates[2].percent, 50);
    }

    #[test]
    fn creation_day_follows_the_local_offset() {
        // 22:30 UTC on the 14th is already the 15th at UTC+2.
        let created = Utc.with_ymd_and_hms(2025, 10, 14, 22, 30, 0).unwrap();
        let habit = Habit::create(HabitId::new("h"), NewHabit::named("read"), created).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let today = date(2025, 10, 15);

        assert_eq!(tracking_start(&habit, today, plus_two), today);
        let stats = habit_stats(&habit, today, plus_two);
        assert_eq!(stats.times_missed, 1);
        assert_eq!(stats.total_percent, 0);

        let rates = monthly_rates(&habit, today, plus_two, 1);
        assert_eq!(rates[0].tracked_days, 1);

        // Read in UTC the same instant is a day earlier.
        assert_eq!(habit_stats(&habit, today, utc()).times_missed, 2);
    }
}
