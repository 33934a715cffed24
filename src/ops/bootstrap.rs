use log::info;

use crate::io::kv_store::KeyValueStore;
use crate::io::persist;
use crate::model::task::Task;
use crate::ops::state_store::AppState;

/// A drag needs two cards to be meaningful; bootstrap guarantees at least this many.
pub const MIN_TASKS: usize = 2;

/// Seed cards, appended in order until the collection reaches `MIN_TASKS`.
fn seed_cards() -> Vec<Task> {
    vec![
        Task::new(1, "Demo Task")
            .with_subtask(1, "Try swipe right")
            .with_subtask(2, "Try swipe left"),
        Task::new(2, "Drag me").with_subtask(1, "Grab the header to reorder"),
    ]
}

/// Load the store into an `AppState`, seeding and persisting when fewer
/// than `MIN_TASKS` tasks exist. The display mode comes from the store, or
/// `dark_default` when it was never saved.
pub fn bootstrap(store: &mut dyn KeyValueStore, dark_default: bool) -> AppState {
    let records = persist::load_tasks(store);
    let loaded = records.len();
    let mut state = AppState::new(records);

    let seeded = seed_missing(&mut state);
    if seeded > 0 {
        info!(
            "event=bootstrap_seeded module=bootstrap loaded={} seeded={}",
            loaded, seeded
        );
        persist::save_tasks(store, &state);
    }

    state.dark_mode = persist::load_dark_mode(store).unwrap_or(dark_default);
    info!(
        "event=bootstrap module=bootstrap status=ok tasks={} dark={}",
        state.task_count(),
        state.dark_mode
    );
    state
}

/// Append seed cards until the state holds `MIN_TASKS`. Seeds take the next
/// free ids. Returns how many were added.
fn seed_missing(state: &mut AppState) -> usize {
    let mut added = 0;
    for mut seed in seed_cards() {
        if state.task_count() >= MIN_TASKS {
            break;
        }
        seed.id = state.next_task_id();
        state.append_task(seed);
        added += 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv_store::MemoryStore;
    use crate::io::persist::{DARK_MODE_KEY, TASKS_KEY};
    use pretty_assertions::assert_eq;

    fn titles(state: &AppState) -> Vec<String> {
        state.tasks().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn empty_store_gets_both_seeds_and_is_persisted() {
        let mut store = MemoryStore::new();
        let state = bootstrap(&mut store, false);
        assert_eq!(titles(&state), vec!["Demo Task", "Drag me"]);
        assert_eq!(state.task_ids(), vec![1, 2]);
        assert_eq!(store.write_count(TASKS_KEY), 1);
        assert_eq!(persist::load_tasks(&store).len(), 2);
    }

    #[test]
    fn single_task_gets_one_seed_with_fresh_id() {
        let mut store = MemoryStore::new()
            .with_value(TASKS_KEY, r#"[{"id":5,"title":"Mine","subtasks":[]}]"#);
        let state = bootstrap(&mut store, false);
        assert_eq!(titles(&state), vec!["Mine", "Demo Task"]);
        assert_eq!(state.task_ids(), vec![5, 6]);
    }

    #[test]
    fn two_tasks_are_left_alone() {
        let mut store = MemoryStore::new().with_value(
            TASKS_KEY,
            r#"[{"id":1,"title":"A","subtasks":[]},{"id":2,"title":"B","subtasks":[]}]"#,
        );
        let state = bootstrap(&mut store, false);
        assert_eq!(titles(&state), vec!["A", "B"]);
        assert_eq!(store.write_count(TASKS_KEY), 0);
    }

    #[test]
    fn corrupt_tasks_are_reseeded() {
        let mut store = MemoryStore::new().with_value(TASKS_KEY, "{oops");
        let state = bootstrap(&mut store, false);
        assert_eq!(state.task_count(), 2);
        assert_eq!(store.write_count(TASKS_KEY), 1);
    }

    #[test]
    fn seeding_is_deterministic() {
        let a = bootstrap(&mut MemoryStore::new(), false);
        let b = bootstrap(&mut MemoryStore::new(), false);
        assert_eq!(
            a.tasks().cloned().collect::<Vec<_>>(),
            b.tasks().cloned().collect::<Vec<_>>()
        );
    }

    #[test]
    fn dark_mode_prefers_saved_flag() {
        let mut store = MemoryStore::new().with_value(DARK_MODE_KEY, "false");
        assert!(!bootstrap(&mut store, true).dark_mode);
        let mut store = MemoryStore::new();
        assert!(bootstrap(&mut store, true).dark_mode);
    }
}
