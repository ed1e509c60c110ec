//! Habit collection codec over a key-value store.
//!
//! # Responsibility
//! - Serialize the full collection as a JSON array under `HABITS_KEY`.
//! - Distinguish "never persisted" from "persisted empty".
//! - Repair individual stored records instead of discarding the collection.
//!
//! # Invariants
//! - Only a payload that is not a JSON array fails decoding.
//! - Decoded collections have pairwise distinct, non-empty ids; later
//!   duplicates get a fresh id, the first occurrence keeps its own.
//! - Missing optional fields decode as absent (no schema migration).

use crate::model::habit::{Habit, HabitId};
use crate::repo::kv_store::{KeyValueStore, KvError};
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the habit collection.
pub const HABITS_KEY: &str = "habits";

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure while loading or saving the habit collection.
#[derive(Debug)]
pub enum RepoError {
    Storage(KvError),
    Json(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid habits json: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Whole-collection persistence used by the habit store.
pub trait HabitRepository {
    /// Returns `None` when nothing was ever saved.
    fn load_habits(&self) -> RepoResult<Option<Vec<Habit>>>;
    fn save_habits(&self, habits: &[Habit]) -> RepoResult<()>;
}

/// `HabitRepository` backed by any `KeyValueStore`.
pub struct KvHabitRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvHabitRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> HabitRepository for KvHabitRepository<S> {
    fn load_habits(&self) -> RepoResult<Option<Vec<Habit>>> {
        match self.store.get(HABITS_KEY)? {
            Some(json) => Ok(Some(decode_habits(&json)?)),
            None => Ok(None),
        }
    }

    fn save_habits(&self, habits: &[Habit]) -> RepoResult<()> {
        let json = encode_habits(habits)?;
        self.store.set(HABITS_KEY, &json)?;
        Ok(())
    }
}

/// Encodes the collection in stored wire format.
pub fn encode_habits(habits: &[Habit]) -> RepoResult<String> {
    Ok(serde_json::to_string(habits)?)
}

/// Decodes a stored collection record by record.
///
/// Records that are not habit-shaped are skipped, blank names are kept for
/// the user to fix, and colliding or empty ids are replaced. Each repair is
/// logged.
///
/// # Errors
/// - `Json` when the payload is not a JSON array.
pub fn decode_habits(json: &str) -> RepoResult<Vec<Habit>> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut habits = Vec::with_capacity(records.len());
    let mut seen: HashSet<HabitId> = HashSet::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let mut habit = match serde_json::from_value::<Habit>(record) {
            Ok(habit) => habit,
            Err(_) => {
                warn!(
                    "event=habits_decode module=repo status=skipped index={index} reason=invalid_record"
                );
                continue;
            }
        };

        if habit.name.trim().is_empty() {
            warn!("event=habits_decode module=repo status=kept index={index} reason=blank_name");
        }

        let reason = if habit.id.as_str().trim().is_empty() {
            Some("empty_id")
        } else if seen.contains(&habit.id) {
            Some("duplicate_id")
        } else {
            None
        };
        if let Some(reason) = reason {
            let replacement = unused_id(&seen);
            warn!(
                "event=habits_decode module=repo status=repaired index={index} reason={reason} old_id={} new_id={replacement}",
                habit.id
            );
            habit.id = replacement;
        }

        seen.insert(habit.id.clone());
        habits.push(habit);
    }

    Ok(habits)
}

fn unused_id(taken: &HashSet<HabitId>) -> HabitId {
    loop {
        let id = HabitId::generate();
        if !taken.contains(&id) {
            return id;
        }
    }
}
