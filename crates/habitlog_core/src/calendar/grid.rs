//! Month and week grids.
//!
//! # Invariants
//! - `month_days` yields every day of the reference month in ascending order.
//! - `current_week_range` yields exactly seven days, Monday through Sunday.
//! - Exactly one cell is flagged `today` (the reference date).

use crate::model::habit::Habit;
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// One calendar cell of a tracking grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,
    /// 1-based day of month.
    pub day: u32,
    pub weekday: Weekday,
    /// Grid-local completion flag; unrelated to `Habit::done`.
    pub done: bool,
    pub today: bool,
}

impl Day {
    fn new(date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            date,
            day: date.day(),
            weekday: date.weekday(),
            done: false,
            today: date == today,
        }
    }

    /// Three-letter English weekday label (`Mon`..`Sun`).
    pub fn weekday_label(&self) -> &'static str {
        match self.weekday {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }
}

/// Days of one calendar month plus the position of today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthDays {
    pub days: Vec<Day>,
    /// Zero-based index of the reference date inside `days`.
    pub today_index: usize,
}

impl MonthDays {
    /// Index a horizontal list should scroll to so that today stays visible
    /// with one day of leading context.
    pub fn scroll_index(&self) -> usize {
        self.today_index.saturating_sub(1)
    }
}

/// Builds every day of the month containing `reference`.
pub fn month_days(reference: NaiveDate) -> MonthDays {
    let first = reference - Days::new(u64::from(reference.day0()));
    let month = reference.month();
    let days = first
        .iter_days()
        .take_while(|date| date.month() == month)
        .map(|date| Day::new(date, reference))
        .collect();

    MonthDays {
        days,
        today_index: reference.day0() as usize,
    }
}

/// Builds Monday..Sunday of the week containing `reference`, crossing month
/// boundaries when needed.
pub fn current_week_range(reference: NaiveDate) -> Vec<Day> {
    week_start(reference)
        .iter_days()
        .take(7)
        .map(|date| Day::new(date, reference))
        .collect()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    // Sunday is 6 days after Monday, any other weekday is `weekday - 1`.
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Month grid with `done` taken from the habit's completion history.
pub fn habit_month_grid(habit: &Habit, reference: NaiveDate) -> MonthDays {
    let mut grid = month_days(reference);
    mark_completions(habit, &mut grid.days);
    grid
}

/// Week grid with `done` taken from the habit's completion history.
pub fn habit_week_grid(habit: &Habit, reference: NaiveDate) -> Vec<Day> {
    let mut days = current_week_range(reference);
    mark_completions(habit, &mut days);
    days
}

fn mark_completions(habit: &Habit, days: &mut [Day]) {
    for day in days {
        day.done = habit.is_completed_on(day.date);
    }
}
