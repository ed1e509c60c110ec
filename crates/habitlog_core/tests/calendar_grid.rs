use chrono::{NaiveDate, Utc};
use habitlog_core::{
    current_week_range, habit_month_grid, habit_week_grid, month_days, Habit, HabitId, NewHabit,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn october_grid_has_31_days_with_only_the_15th_marked_today() {
    let grid = month_days(date(2025, 10, 15));

    assert_eq!(grid.days.len(), 31);
    assert_eq!(grid.today_index, 14);
    for (index, day) in grid.days.iter().enumerate() {
        assert_eq!(day.day as usize, index + 1);
        assert_eq!(day.today, day.day == 15, "day {}", day.day);
        assert!(!day.done);
    }
    assert_eq!(grid.days[14].weekday_label(), "Wed");
    assert_eq!(grid.days[0].weekday_label(), "Wed");
}

#[test]
fn week_of_wednesday_runs_monday_to_sunday() {
    let week = current_week_range(date(2025, 10, 15));

    assert_eq!(week.len(), 7);
    assert_eq!(week[0].date, date(2025, 10, 13));
    assert_eq!(week[6].date, date(2025, 10, 19));
    let labels: Vec<&str> = week.iter().map(|day| day.weekday_label()).collect();
    assert_eq!(labels, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
    assert_eq!(week.iter().filter(|day| day.today).count(), 1);
    assert!(week[2].today);
    assert_eq!(week[2].day, 15);
}

#[test]
fn week_of_sunday_starts_six_days_earlier() {
    let week = current_week_range(date(2025, 10, 19));
    assert_eq!(week[0].date, date(2025, 10, 13));
    assert!(week[6].today);
}

#[test]
fn grids_are_deterministic() {
    let reference = date(2025, 10, 15);
    assert_eq!(month_days(reference), month_days(reference));
    assert_eq!(current_week_range(reference), current_week_range(reference));
}

#[test]
fn habit_grids_overlay_completion_history() {
    let mut habit = Habit::create(HabitId::new("h"), NewHabit::named("walk"), Utc::now()).unwrap();
    habit.toggle_completion(date(2025, 10, 10));
    habit.toggle_completion(date(2025, 10, 14));
    habit.toggle_completion(date(2025, 9, 30));

    let grid = habit_month_grid(&habit, date(2025, 10, 15));
    let done: Vec<u32> = grid.days.iter().filter(|d| d.done).map(|d| d.day).collect();
    assert_eq!(done, [10, 14]);

    let week = habit_week_grid(&habit, date(2025, 10, 15));
    let done: Vec<u32> = week.iter().filter(|d| d.done).map(|d| d.day).collect();
    assert_eq!(done, [14]);
}
