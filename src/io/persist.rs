use log::{error, warn};

use crate::io::kv_store::KeyValueStore;
use crate::model::task::Task;
use crate::ops::state_store::AppState;

/// Key holding the JSON array of tasks
pub const TASKS_KEY: &str = "tasks";

/// Key holding the display-mode flag ("true" / "false")
pub const DARK_MODE_KEY: &str = "dark";

/// Read the task collection. Missing or malformed JSON reads as empty.
pub fn load_tasks(store: &dyn KeyValueStore) -> Vec<Task> {
    let Some(raw) = store.get(TASKS_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!("event=tasks_malformed module=persist reason={} action=treat_as_empty", e);
            Vec::new()
        }
    }
}

/// Write the task collection in display order
pub fn save_tasks(store: &mut dyn KeyValueStore, state: &AppState) {
    let records: Vec<&Task> = state.tasks().collect();
    match serde_json::to_string(&records) {
        Ok(json) => store.set(TASKS_KEY, &json),
        Err(e) => error!("event=tasks_save module=persist status=error reason={}", e),
    }
}

/// Read the display-mode flag, or None if it was never saved
pub fn load_dark_mode(store: &dyn KeyValueStore) -> Option<bool> {
    store.get(DARK_MODE_KEY).map(|v| v == "true")
}

pub fn save_dark_mode(store: &mut dyn KeyValueStore, dark: bool) {
    store.set(DARK_MODE_KEY, if dark { "true" } else { "false" });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv_store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn save_then_load_preserves_order_and_times() {
        let mut store = MemoryStore::new();
        let mut state = AppState::new(vec![
            Task::new(2, "Second").with_subtask(1, "s"),
            Task::new(1, "First"),
        ]);
        state.reorder_tasks(&[1, 2]);
        save_tasks(&mut store, &state);

        let loaded = load_tasks(&store);
        assert_eq!(loaded.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(loaded[1].subtasks[0].title, "s");
    }

    #[test]
    fn persisted_shape_uses_elapsed_ms() {
        let mut store = MemoryStore::new();
        let state = AppState::new(vec![Task::new(1, "T").with_subtask(1, "S")]);
        save_tasks(&mut store, &state);
        assert_eq!(
            store.get(TASKS_KEY).unwrap(),
            r#"[{"id":1,"title":"T","subtasks":[{"id":1,"title":"S","elapsedMs":0}]}]"#
        );
    }

    #[test]
    fn malformed_tasks_read_as_empty() {
        let store = MemoryStore::new().with_value(TASKS_KEY, "[{\"id\":");
        assert!(load_tasks(&store).is_empty());
    }

    #[test]
    fn dark_mode_flag() {
        let mut store = MemoryStore::new();
        assert_eq!(load_dark_mode(&store), None);
        save_dark_mode(&mut store, true);
        assert_eq!(store.get(DARK_MODE_KEY).as_deref(), Some("true"));
        assert_eq!(load_dark_mode(&store), Some(true));
        save_dark_mode(&mut store, false);
        assert_eq!(load_dark_mode(&store), Some(false));
    }
}
