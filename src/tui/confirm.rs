use log::info;

use crate::io::kv_store::KeyValueStore;
use crate::io::persist;
use crate::model::task::SubtaskKey;
use crate::ops::state_store::AppState;

use super::list_view::ListView;
use super::scheduler::RenderScheduler;

/// Receiver of delete requests from a committed left swipe. The swipe never
/// deletes on its own; whoever implements this decides.
pub trait DeleteConfirmation {
    fn request_delete_confirmation(&mut self, key: SubtaskKey);
}

/// Modal y/n prompt guarding subtask deletion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmDialog {
    pending: Option<SubtaskKey>,
}

impl DeleteConfirmation for ConfirmDialog {
    fn request_delete_confirmation(&mut self, key: SubtaskKey) {
        self.pending = Some(key);
    }
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<SubtaskKey> {
        self.pending
    }

    /// Delete the pending subtask (clearing the timer if it was running),
    /// persist, and rebuild. Returns the deleted key, or None if nothing was
    /// pending or the subtask is already gone.
    pub fn accept(
        &mut self,
        state: &mut AppState,
        scheduler: &mut RenderScheduler,
        view: &mut ListView,
        store: &mut dyn KeyValueStore,
    ) -> Option<SubtaskKey> {
        let key = self.pending.take()?;
        state.delete_subtask(key)?;
        persist::save_tasks(store, state);
        scheduler.render_full(state, view);
        Some(key)
    }

    pub fn decline(&mut self) {
        if let Some(key) = self.pending.take() {
            info!("event=delete_declined module=confirm key={}", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv_store::MemoryStore;
    use crate::io::persist::TASKS_KEY;
    use crate::model::task::Task;
    use crate::tui::geometry::CellMetrics;
    use std::time::Instant;

    fn setup() -> (AppState, ListView, RenderScheduler, MemoryStore) {
        let state = AppState::new(vec![
            Task::new(1, "One").with_subtask(1, "a").with_subtask(2, "b"),
            Task::new(2, "Two").with_subtask(1, "c"),
        ]);
        let mut view = ListView::new(CellMetrics::default());
        let mut scheduler = RenderScheduler::new();
        scheduler.render_full(&state, &mut view);
        (state, view, scheduler, MemoryStore::new())
    }

    #[test]
    fn accept_deletes_persists_and_rebuilds() {
        let (mut state, mut view, mut scheduler, mut store) = setup();
        let key = SubtaskKey::new(1, 1);
        state.toggle_timer(key, Instant::now());

        let mut dialog = ConfirmDialog::new();
        dialog.request_delete_confirmation(key);
        assert!(dialog.is_open());

        let deleted = dialog.accept(&mut state, &mut scheduler, &mut view, &mut store);
        assert_eq!(deleted, Some(key));
        assert!(!dialog.is_open());
        assert!(state.subtask(key).is_none());
        assert!(state.active_timer().is_none());
        assert!(view.row(key).is_none());
        assert!(view.row(SubtaskKey::new(1, 2)).is_some());
        assert_eq!(scheduler.stats().full, 2);
        assert_eq!(store.write_count(TASKS_KEY), 1);
    }

    #[test]
    fn decline_leaves_everything() {
        let (state, _view, scheduler, store) = setup();
        let mut dialog = ConfirmDialog::new();
        dialog.request_delete_confirmation(SubtaskKey::new(2, 1));
        dialog.decline();
        assert!(!dialog.is_open());
        assert!(state.subtask(SubtaskKey::new(2, 1)).is_some());
        assert_eq!(scheduler.stats().full, 1);
        assert_eq!(store.write_count(TASKS_KEY), 0);
    }

    #[test]
    fn accept_of_vanished_subtask_is_noop() {
        let (mut state, mut view, mut scheduler, mut store) = setup();
        let mut dialog = ConfirmDialog::new();
        dialog.request_delete_confirmation(SubtaskKey::new(9, 9));
        assert!(dialog
            .accept(&mut state, &mut scheduler, &mut view, &mut store)
            .is_none());
        assert!(!dialog.is_open());
        assert_eq!(store.write_count(TASKS_KEY), 0);
    }
}
