//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical habit record persisted under the `habits` key.
//! - Normalize and validate user input before it reaches the collection.
//! - Provide the first-run demonstration set.
//!
//! # Invariants
//! - `id` is stable for the habit lifetime and never reused.
//! - `created_at` is assigned once at creation and never edited.
//! - `done` and `completions` are independent: the flag has no date
//!   dimension, the history is keyed by calendar day.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable string identifier of a habit.
///
/// Fresh ids are time-ordered UUIDv7 strings; records written by earlier
/// app versions may carry arbitrary strings (for example epoch millis).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a new timestamp-prefixed id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for HabitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// How often a habit is meant to be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
}

impl Frequency {
    /// Parses a case-insensitive frequency label.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Custom => "Custom",
        }
    }
}

/// Validation failures for habit input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    /// Name is empty after trimming.
    EmptyName,
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "habit name cannot be empty"),
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical persisted habit record.
///
/// Serialized with camelCase keys; optional fields are omitted when absent so
/// records written by older versions and by this one share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Absent only on records written before creation time was tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    /// Calendar days on which the habit was completed.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub completions: BTreeSet<NaiveDate>,
}

/// Input accepted by the add-habit flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    pub frequency: Option<Frequency>,
    pub notes: Option<String>,
    pub goal: Option<String>,
    /// Defaults to the creation instant when `None`.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewHabit {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update for an existing habit. `None` keeps the current value;
/// notes/goal that trim to empty clear the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitEdit {
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    pub notes: Option<String>,
    pub goal: Option<String>,
}

impl Habit {
    /// Builds a habit from add-flow input.
    ///
    /// # Errors
    /// - `EmptyName` when `input.name` trims to empty.
    pub fn create(
        id: HabitId,
        input: NewHabit,
        now: DateTime<Utc>,
    ) -> Result<Self, HabitValidationError> {
        let name = normalize_name(&input.name)?;
        Ok(Self {
            id,
            name,
            done: false,
            frequency: input.frequency,
            notes: normalize_optional(input.notes),
            created_at: Some(input.created_at.unwrap_or(now)),
            goal: normalize_optional(input.goal),
            completions: BTreeSet::new(),
        })
    }

    /// Applies an edit. Nothing changes when validation fails.
    pub fn apply_edit(&mut self, edit: HabitEdit) -> Result<(), HabitValidationError> {
        let name = edit.name.as_deref().map(normalize_name).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(frequency) = edit.frequency {
            self.frequency = Some(frequency);
        }
        if edit.notes.is_some() {
            self.notes = normalize_optional(edit.notes);
        }
        if edit.goal.is_some() {
            self.goal = normalize_optional(edit.goal);
        }
        Ok(())
    }

    pub fn toggle_done(&mut self) {
        self.done = !self.done;
    }

    /// Flips completion for `date` and returns the new state.
    pub fn toggle_completion(&mut self, date: NaiveDate) -> bool {
        if self.completions.remove(&date) {
            false
        } else {
            self.completions.insert(date);
            true
        }
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completions.contains(&date)
    }

    /// Calendar day of creation as seen at `offset`, when known.
    pub fn created_on(&self, offset: FixedOffset) -> Option<NaiveDate> {
        self.created_at
            .map(|at| at.with_timezone(&offset).date_naive())
    }
}

/// Demonstration habits shown on first launch only.
pub fn seed_habits(now: DateTime<Utc>) -> Vec<Habit> {
    [
        ("1", "Morning stretch", true),
        ("2", "Drink 2L of water", false),
        ("3", "Read 20 minutes", false),
    ]
    .into_iter()
    .map(|(id, name, done)| Habit {
        id: HabitId::new(id),
        name: name.to_string(),
        done,
        frequency: None,
        notes: None,
        created_at: Some(now),
        goal: None,
        completions: BTreeSet::new(),
    })
    .collect()
}

fn normalize_name(raw: &str) -> Result<String, HabitValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(HabitValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
