//! Shared habit state container.
//!
//! # Responsibility
//! - Hold the single authoritative habit collection of a running app.
//! - Load once at startup, persist the whole collection after each change.
//! - Notify subscribers synchronously after every applied change.
//!
//! # Invariants
//! - Ids are unique across the collection; new habits are appended.
//! - Nothing is persisted before `load` has completed (ready gate), so an
//!   empty pre-load state never overwrites saved data.
//! - Memory is authoritative: a failed save is logged, never rolled back,
//!   and retried implicitly by the next change (eventual durability).
//! - No-op mutations (unknown id) neither persist nor notify.

use crate::model::habit::{seed_habits, Habit, HabitEdit, HabitId, HabitValidationError, NewHabit};
use crate::repo::habit_repo::HabitRepository;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, warn};

type Listener = Box<dyn FnMut(&[Habit]) + Send>;

/// Handle returned by `HabitStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What `HabitStore::load` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored collection with this many habits was restored.
    Restored(usize),
    /// Nothing was stored; the demonstration set was installed.
    Seeded(usize),
    /// Storage was unreadable or corrupt; started empty.
    Recovered,
}

/// Habit collection plus its load/save protocol.
///
/// One instance exists per running application and is handed to consumers
/// explicitly.
pub struct HabitStore<R: HabitRepository> {
    repo: R,
    habits: Vec<Habit>,
    ready: bool,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl<R: HabitRepository> HabitStore<R> {
    /// Creates an empty, not-yet-ready store.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            habits: Vec::new(),
            ready: false,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Loads the persisted collection; see `load_at`.
    pub fn load(&mut self) -> LoadOutcome {
        self.load_at(Utc::now())
    }

    /// Loads the persisted collection, seeding on first run.
    ///
    /// Never fails: unreadable storage leaves an empty collection. The ready
    /// flag is set in every case. The seed set is not written here; it
    /// reaches storage with the first real change.
    pub fn load_at(&mut self, now: DateTime<Utc>) -> LoadOutcome {
        let outcome = match self.repo.load_habits() {
            Ok(Some(habits)) => {
                let count = habits.len();
                self.habits = habits;
                info!("event=habits_load module=store status=ok source=storage count={count}");
                LoadOutcome::Restored(count)
            }
            Ok(None) => {
                self.habits = seed_habits(now);
                let count = self.habits.len();
                info!("event=habits_load module=store status=ok source=seed count={count}");
                LoadOutcome::Seeded(count)
            }
            Err(err) => {
                self.habits = Vec::new();
                error!(
                    "event=habits_load module=store status=error error_code=load_failed error={err}"
                );
                LoadOutcome::Recovered
            }
        };

        self.ready = true;
        self.notify();
        outcome
    }

    /// Whether initial load has completed and saves are enabled.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current collection in insertion order.
    pub fn list(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == id)
    }

    /// Appends a new habit; see `add_at`.
    pub fn add(&mut self, input: NewHabit) -> Result<HabitId, HabitValidationError> {
        self.add_at(input, Utc::now())
    }

    /// Appends a new habit created at `now` unless the input carries its own
    /// creation time.
    ///
    /// # Errors
    /// - `EmptyName` when the name trims to empty; nothing is changed or saved.
    pub fn add_at(
        &mut self,
        input: NewHabit,
        now: DateTime<Utc>,
    ) -> Result<HabitId, HabitValidationError> {
        let habit = match Habit::create(self.fresh_id(), input, now) {
            Ok(habit) => habit,
            Err(err) => {
                warn!("event=habit_add module=store status=rejected reason={err}");
                return Err(err);
            }
        };

        let id = habit.id.clone();
        self.habits.push(habit);
        info!("event=habit_add module=store status=ok id={id}");
        self.commit("habit_add");
        Ok(id)
    }

    /// Flips the habit-level `done` flag. Returns `false` for unknown ids.
    pub fn toggle(&mut self, id: &HabitId) -> bool {
        let Some(habit) = self.find_mut(id) else {
            debug!("event=habit_toggle module=store status=noop id={id}");
            return false;
        };
        habit.toggle_done();
        let done = habit.done;
        info!("event=habit_toggle module=store status=ok id={id} done={done}");
        self.commit("habit_toggle");
        true
    }

    /// Removes the habit. Returns `false` (no-op) for unknown ids.
    pub fn delete(&mut self, id: &HabitId) -> bool {
        let Some(index) = self.habits.iter().position(|habit| &habit.id == id) else {
            debug!("event=habit_delete module=store status=noop id={id}");
            return false;
        };
        self.habits.remove(index);
        info!("event=habit_delete module=store status=ok id={id}");
        self.commit("habit_delete");
        true
    }

    /// Edits descriptive fields. Returns `Ok(false)` for unknown ids.
    ///
    /// # Errors
    /// - `EmptyName` when a replacement name trims to empty.
    pub fn edit(&mut self, id: &HabitId, edit: HabitEdit) -> Result<bool, HabitValidationError> {
        let Some(habit) = self.find_mut(id) else {
            debug!("event=habit_edit module=store status=noop id={id}");
            return Ok(false);
        };
        if let Err(err) = habit.apply_edit(edit) {
            warn!("event=habit_edit module=store status=rejected id={id} reason={err}");
            return Err(err);
        }
        info!("event=habit_edit module=store status=ok id={id}");
        self.commit("habit_edit");
        Ok(true)
    }

    /// Flips completion of `date` in the habit history.
    ///
    /// Returns the new completion state, or `None` for unknown ids.
    pub fn toggle_day(&mut self, id: &HabitId, date: NaiveDate) -> Option<bool> {
        let Some(habit) = self.find_mut(id) else {
            debug!("event=habit_toggle_day module=store status=noop id={id}");
            return None;
        };
        let completed = habit.toggle_completion(date);
        info!(
            "event=habit_toggle_day module=store status=ok id={id} date={date} completed={completed}"
        );
        self.commit("habit_toggle_day");
        Some(completed)
    }

    /// Registers a change listener; it is called with the full collection
    /// after each applied change and after `load`.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Habit]) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn find_mut(&mut self, id: &HabitId) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| &habit.id == id)
    }

    fn fresh_id(&self) -> HabitId {
        loop {
            let id = HabitId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn commit(&mut self, event: &str) {
        self.persist(event);
        self.notify();
    }

    fn persist(&self, event: &str) {
        if !self.ready {
            debug!("event=habits_save module=store status=skipped trigger={event} reason=not_ready");
            return;
        }
        match self.repo.save_habits(&self.habits) {
            Ok(()) => debug!(
                "event=habits_save module=store status=ok trigger={event} count={}",
                self.habits.len()
            ),
            Err(err) => error!(
                "event=habits_save module=store status=error trigger={event} error_code=save_failed error={err}"
            ),
        }
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.habits);
        }
    }
}
