use std::collections::{HashMap, HashSet};
use std::time::Instant;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::model::task::{Subtask, SubtaskKey, Task, TaskId};
use crate::model::timer::ActiveTimer;

/// Result of a timer toggle commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No timer was running; the key is now timed
    Started,
    /// The key was the running timer and is now frozen
    Stopped,
    /// A different subtask was running; it is frozen and the key is now timed
    Switched { from: SubtaskKey },
    /// The key does not name an existing subtask
    Missing,
}

/// Result of one timer-loop recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No timer is running
    Idle,
    /// The timed subtask now reads `elapsed_ms`
    Advanced { key: SubtaskKey, elapsed_ms: u64 },
    /// The timed subtask no longer exists; the timer was cleared
    Orphaned { key: SubtaskKey },
}

/// The single owned aggregate behind every view and gesture.
///
/// Tasks are held in display order, keyed by id. `subtask_slots` maps each
/// composite subtask key to its position within the owning task, so the
/// per-frame timer path never scans. Nothing outside this type keeps
/// references into it; callers look entities up by id when they need them.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    tasks: IndexMap<TaskId, Task>,
    subtask_slots: HashMap<SubtaskKey, usize>,
    active: Option<ActiveTimer>,
    pub dark_mode: bool,
}

impl AppState {
    /// Build the store from loaded records. Duplicate task ids, and duplicate
    /// subtask ids within one task, keep their first occurrence.
    pub fn new(records: Vec<Task>) -> Self {
        let mut tasks = IndexMap::with_capacity(records.len());
        for mut task in records {
            if tasks.contains_key(&task.id) {
                warn!("event=duplicate_task module=state task_id={} action=dropped", task.id);
                continue;
            }
            let mut seen = HashSet::new();
            task.subtasks.retain(|st| {
                let fresh = seen.insert(st.id);
                if !fresh {
                    warn!(
                        "event=duplicate_subtask module=state task_id={} subtask_id={} action=dropped",
                        task.id, st.id
                    );
                }
                fresh
            });
            tasks.insert(task.id, task);
        }

        let mut state = AppState {
            tasks,
            subtask_slots: HashMap::new(),
            active: None,
            dark_mode: false,
        };
        state.reindex_all();
        state
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Tasks in display order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn subtask(&self, key: SubtaskKey) -> Option<&Subtask> {
        let slot = *self.subtask_slots.get(&key)?;
        self.tasks.get(&key.task_id)?.subtasks.get(slot)
    }

    fn subtask_mut(&mut self, key: SubtaskKey) -> Option<&mut Subtask> {
        let slot = *self.subtask_slots.get(&key)?;
        self.tasks.get_mut(&key.task_id)?.subtasks.get_mut(slot)
    }

    pub fn active_timer(&self) -> Option<&ActiveTimer> {
        self.active.as_ref()
    }

    pub fn is_running(&self, key: SubtaskKey) -> bool {
        self.active.is_some_and(|t| t.key == key)
    }

    /// The next unused task id
    pub fn next_task_id(&self) -> TaskId {
        self.tasks.keys().max().map_or(1, |max| max + 1)
    }

    // -----------------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------------

    /// Start, stop or switch the active timer for `key`.
    ///
    /// A subtask that stops being timed has its elapsed time synced to `now`
    /// and then frozen.
    pub fn toggle_timer(&mut self, key: SubtaskKey, now: Instant) -> ToggleOutcome {
        if self.active.is_some_and(|t| t.key == key) {
            self.freeze_active(now);
            info!("event=timer_stop module=state key={}", key);
            return ToggleOutcome::Stopped;
        }

        let base = match self.subtask(key) {
            Some(st) => st.elapsed_ms,
            None => {
                debug!("event=timer_toggle module=state key={} status=missing", key);
                return ToggleOutcome::Missing;
            }
        };

        let previous = self.freeze_active(now);
        self.active = Some(ActiveTimer::start(key, base, now));
        match previous {
            Some(from) => {
                info!("event=timer_switch module=state from={} to={}", from, key);
                ToggleOutcome::Switched { from }
            }
            None => {
                info!("event=timer_start module=state key={} base_ms={}", key, base);
                ToggleOutcome::Started
            }
        }
    }

    /// Sync the running subtask to `now` and clear the timer.
    /// Returns the key that was running, if any.
    fn freeze_active(&mut self, now: Instant) -> Option<SubtaskKey> {
        let timer = self.active.take()?;
        if let Some(st) = self.subtask_mut(timer.key) {
            st.elapsed_ms = timer.elapsed_at(now);
        }
        Some(timer.key)
    }

    /// Recompute the running subtask's elapsed time from the timer's start
    /// instant. A timer whose subtask has disappeared is cleared.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let timer = match self.active {
            Some(t) => t,
            None => return TickOutcome::Idle,
        };
        match self.subtask_mut(timer.key) {
            Some(st) => {
                st.elapsed_ms = timer.elapsed_at(now);
                TickOutcome::Advanced {
                    key: timer.key,
                    elapsed_ms: st.elapsed_ms,
                }
            }
            None => {
                self.active = None;
                warn!("event=timer_orphaned module=state key={} action=cleared", timer.key);
                TickOutcome::Orphaned { key: timer.key }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Structural mutations
    // -----------------------------------------------------------------------

    /// Remove a subtask. Clears the active timer when it pointed at the
    /// removed subtask. Returns the removed record, or None if absent.
    pub fn delete_subtask(&mut self, key: SubtaskKey) -> Option<Subtask> {
        let slot = self.subtask_slots.remove(&key)?;
        let task = self.tasks.get_mut(&key.task_id)?;
        if slot >= task.subtasks.len() {
            return None;
        }
        let removed = task.subtasks.remove(slot);
        self.reindex_task(key.task_id);

        if self.active.is_some_and(|t| t.key == key) {
            self.active = None;
            info!("event=timer_cleared module=state key={} reason=deleted", key);
        }
        info!("event=subtask_deleted module=state key={}", key);
        Some(removed)
    }

    /// Re-sort tasks to match `visual_order`.
    ///
    /// Stable sort keyed by each id's position in `visual_order`. Tasks the
    /// order does not mention keep their relative order after the listed
    /// ones; ids that name no task are ignored. Returns whether the order
    /// changed.
    pub fn reorder_tasks(&mut self, visual_order: &[TaskId]) -> bool {
        let rank: HashMap<TaskId, usize> = visual_order
            .iter()
            .enumerate()
            .rev()
            .map(|(i, id)| (*id, i))
            .collect();
        let before = self.task_ids();
        self.tasks.sort_by(|a, _, b, _| {
            let ra = rank.get(a).copied().unwrap_or(usize::MAX);
            let rb = rank.get(b).copied().unwrap_or(usize::MAX);
            ra.cmp(&rb)
        });
        let changed = before != self.task_ids();
        if changed {
            info!("event=tasks_reordered module=state order={:?}", self.task_ids());
        }
        changed
    }

    /// Append a task, assigning the next free id if `task.id` is taken.
    pub fn append_task(&mut self, mut task: Task) -> TaskId {
        if self.tasks.contains_key(&task.id) {
            task.id = self.next_task_id();
        }
        let id = task.id;
        self.tasks.insert(id, task);
        self.reindex_task(id);
        id
    }

    fn reindex_task(&mut self, task_id: TaskId) {
        self.subtask_slots.retain(|k, _| k.task_id != task_id);
        if let Some(task) = self.tasks.get(&task_id) {
            for (slot, st) in task.subtasks.iter().enumerate() {
                self.subtask_slots.insert(SubtaskKey::new(task_id, st.id), slot);
            }
        }
    }

    fn reindex_all(&mut self) {
        self.subtask_slots.clear();
        for task in self.tasks.values() {
            for (slot, st) in task.subtasks.iter().enumerate() {
                self.subtask_slots.insert(task.key(st), slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn sample_state() -> AppState {
        AppState::new(vec![
            Task::new(1, "Alpha")
                .with_subtask(1, "a1")
                .with_subtask(2, "a2"),
            Task::new(2, "Beta").with_subtask(1, "b1"),
            Task::new(3, "Gamma"),
        ])
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn lookup_uses_composite_keys() {
        let state = sample_state();
        assert_eq!(state.subtask(SubtaskKey::new(1, 1)).unwrap().title, "a1");
        assert_eq!(state.subtask(SubtaskKey::new(2, 1)).unwrap().title, "b1");
        assert!(state.subtask(SubtaskKey::new(2, 2)).is_none());
        assert!(state.subtask(SubtaskKey::new(9, 1)).is_none());
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let state = AppState::new(vec![
            Task::new(1, "First").with_subtask(1, "x").with_subtask(1, "dup"),
            Task::new(1, "Second"),
        ]);
        assert_eq!(state.task_count(), 1);
        assert_eq!(state.task(1).unwrap().title, "First");
        assert_eq!(state.task(1).unwrap().subtasks.len(), 1);
    }

    #[test]
    fn toggle_start_then_stop_freezes_elapsed() {
        let mut state = sample_state();
        let key = SubtaskKey::new(1, 2);
        let t0 = Instant::now();

        assert_eq!(state.toggle_timer(key, t0), ToggleOutcome::Started);
        assert!(state.is_running(key));

        state.tick(t0 + ms(1_000));
        assert_eq!(state.subtask(key).unwrap().elapsed_ms, 1_000);

        assert_eq!(state.toggle_timer(key, t0 + ms(1_500)), ToggleOutcome::Stopped);
        assert!(state.active_timer().is_none());
        assert_eq!(state.subtask(key).unwrap().elapsed_ms, 1_500);

        assert_eq!(state.tick(t0 + ms(9_000)), TickOutcome::Idle);
        assert_eq!(state.subtask(key).unwrap().elapsed_ms, 1_500);
    }

    #[test]
    fn toggle_other_subtask_switches_and_freezes_previous() {
        let mut state = sample_state();
        let a = SubtaskKey::new(1, 1);
        let b = SubtaskKey::new(2, 1);
        let t0 = Instant::now();

        state.toggle_timer(a, t0);
        state.tick(t0 + ms(400));
        assert_eq!(
            state.toggle_timer(b, t0 + ms(500)),
            ToggleOutcome::Switched { from: a }
        );
        assert_eq!(state.active_timer().unwrap().key, b);
        assert_eq!(state.subtask(a).unwrap().elapsed_ms, 500);

        state.tick(t0 + ms(2_500));
        assert_eq!(state.subtask(a).unwrap().elapsed_ms, 500);
        assert_eq!(state.subtask(b).unwrap().elapsed_ms, 2_000);
    }

    #[test]
    fn resumed_timer_continues_from_previous_total() {
        let mut state = sample_state();
        let key = SubtaskKey::new(2, 1);
        let t0 = Instant::now();

        state.toggle_timer(key, t0);
        state.toggle_timer(key, t0 + ms(3_000));
        state.toggle_timer(key, t0 + ms(10_000));
        state.tick(t0 + ms(11_000));
        assert_eq!(state.subtask(key).unwrap().elapsed_ms, 4_000);
    }

    #[test]
    fn toggle_missing_subtask_is_noop() {
        let mut state = sample_state();
        let t0 = Instant::now();
        assert_eq!(
            state.toggle_timer(SubtaskKey::new(3, 1), t0),
            ToggleOutcome::Missing
        );
        assert!(state.active_timer().is_none());
    }

    #[test]
    fn deleting_timed_subtask_clears_timer() {
        let mut state = sample_state();
        let key = SubtaskKey::new(1, 1);
        let t0 = Instant::now();
        state.toggle_timer(key, t0);

        let removed = state.delete_subtask(key).unwrap();
        assert_eq!(removed.title, "a1");
        assert!(state.active_timer().is_none());
        assert_eq!(state.tick(t0 + ms(100)), TickOutcome::Idle);
    }

    #[test]
    fn deleting_other_subtask_keeps_timer_and_reindexes() {
        let mut state = sample_state();
        let timed = SubtaskKey::new(1, 2);
        let t0 = Instant::now();
        state.toggle_timer(timed, t0);

        state.delete_subtask(SubtaskKey::new(1, 1));
        assert!(state.is_running(timed));
        assert_eq!(
            state.tick(t0 + ms(250)),
            TickOutcome::Advanced {
                key: timed,
                elapsed_ms: 250
            }
        );
        assert_eq!(state.task(1).unwrap().subtasks[0].elapsed_ms, 250);
    }

    #[test]
    fn delete_missing_subtask_returns_none() {
        let mut state = sample_state();
        assert!(state.delete_subtask(SubtaskKey::new(2, 7)).is_none());
        assert_eq!(state.task(2).unwrap().subtasks.len(), 1);
    }

    #[test]
    fn reorder_matches_visual_order_exactly() {
        let mut state = sample_state();
        assert!(state.reorder_tasks(&[3, 1, 2]));
        assert_eq!(state.task_ids(), vec![3, 1, 2]);
        assert!(!state.reorder_tasks(&[3, 1, 2]));
    }

    #[test]
    fn reorder_ignores_unknown_and_keeps_unlisted_stable() {
        let mut state = sample_state();
        state.reorder_tasks(&[42, 2]);
        assert_eq!(state.task_ids(), vec![2, 1, 3]);
    }

    #[test]
    fn reorder_keeps_subtask_lookups_valid() {
        let mut state = sample_state();
        state.reorder_tasks(&[2, 3, 1]);
        assert_eq!(state.subtask(SubtaskKey::new(1, 2)).unwrap().title, "a2");
    }

    #[test]
    fn every_permutation_round_trips_without_loss() {
        let perms: [[TaskId; 3]; 6] = [
            [1, 2, 3],
            [1, 3, 2],
            [2, 1, 3],
            [2, 3, 1],
            [3, 1, 2],
            [3, 2, 1],
        ];
        let mut state = sample_state();
        for perm in perms {
            state.reorder_tasks(&perm);
            assert_eq!(state.task_ids(), perm.to_vec());
        }
    }

    #[test]
    fn tick_clears_timer_when_subtask_vanishes() {
        let mut state = sample_state();
        let key = SubtaskKey::new(2, 1);
        let t0 = Instant::now();
        state.toggle_timer(key, t0);
        // Bypass delete_subtask so the timer is left dangling
        state.tasks.get_mut(&2).unwrap().subtasks.clear();
        state.reindex_task(2);

        assert_eq!(state.tick(t0 + ms(16)), TickOutcome::Orphaned { key });
        assert!(state.active_timer().is_none());
    }

    #[test]
    fn append_task_assigns_free_id() {
        let mut state = sample_state();
        let id = state.append_task(Task::new(2, "Clash").with_subtask(1, "c1"));
        assert_eq!(id, 4);
        assert_eq!(state.subtask(SubtaskKey::new(4, 1)).unwrap().title, "c1");
    }
}
