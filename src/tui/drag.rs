use log::{info, warn};

use crate::io::kv_store::KeyValueStore;
use crate::io::persist;
use crate::model::task::TaskId;
use crate::ops::state_store::AppState;

use super::geometry::Point;
use super::list_view::ListView;
use super::scheduler::{ExclusiveGesture, RenderScheduler};

/// How a drag ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Dropped; the store now follows `order`
    Dropped { order: Vec<TaskId>, changed: bool },
    /// Abandoned; the store was not touched
    Cancelled,
}

#[derive(Debug)]
struct DragSession {
    task_id: TaskId,
    start_y: f32,
    freeze: ExclusiveGesture,
}

/// Whole-list drag-to-reorder state machine: `Idle → Dragging → Dropped → Idle`.
///
/// While dragging, only the view's proxy and placeholder move; the store is
/// untouched until the drop, and rendering stays frozen so nothing rebuilds
/// the lifted visuals underneath the pointer.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn dragged_task(&self) -> Option<TaskId> {
        self.session.as_ref().map(|s| s.task_id)
    }

    /// Pointer down on `task_id`'s grab handle. Needs two or more tasks and
    /// an unheld render freeze. Returns whether a drag started.
    pub fn pointer_down(
        &mut self,
        task_id: TaskId,
        at: Point,
        state: &AppState,
        scheduler: &mut RenderScheduler,
        view: &mut ListView,
    ) -> bool {
        if self.session.is_some() || state.task_count() < 2 || state.task(task_id).is_none() {
            return false;
        }
        let Some(freeze) = scheduler.begin_exclusive_gesture() else {
            return false;
        };
        if view.lift_card(task_id).is_none() {
            scheduler.end_exclusive_gesture(freeze);
            return false;
        }
        info!("event=drag_begin module=drag task_id={}", task_id);
        self.session = Some(DragSession {
            task_id,
            start_y: at.y,
            freeze,
        });
        true
    }

    /// Move the proxy by the cumulative pointer delta and re-slot the
    /// placeholder against the proxy's centre.
    pub fn pointer_move(&mut self, at: Point, view: &mut ListView) {
        let Some(session) = &self.session else {
            return;
        };
        view.set_proxy_offset(at.y - session.start_y);
        if let Some(center) = view.proxy_center_y() {
            view.move_placeholder_for(center);
        }
    }

    /// Drop: settle the card into the placeholder's slot, re-sort the store
    /// to the visual order, persist, thaw rendering, and issue exactly one
    /// full render.
    pub fn pointer_up(
        &mut self,
        state: &mut AppState,
        scheduler: &mut RenderScheduler,
        view: &mut ListView,
        store: &mut dyn KeyValueStore,
    ) -> Option<DragOutcome> {
        let session = self.session.take()?;
        if view.settle_card().is_none() {
            warn!(
                "event=drag_drop module=drag task_id={} status=lost_placeholder",
                session.task_id
            );
        }
        let order = view.card_order();
        let changed = state.reorder_tasks(&order);
        persist::save_tasks(store, state);
        scheduler.end_exclusive_gesture(session.freeze);
        scheduler.render_full(state, view);
        info!(
            "event=drag_drop module=drag task_id={} changed={}",
            session.task_id, changed
        );
        Some(DragOutcome::Dropped { order, changed })
    }

    /// Pointer lost: put the card back, thaw rendering, and rebuild so any
    /// time updates held back during the drag show up. The store is not
    /// touched.
    pub fn cancel(
        &mut self,
        state: &AppState,
        scheduler: &mut RenderScheduler,
        view: &mut ListView,
    ) -> Option<DragOutcome> {
        let session = self.session.take()?;
        view.unlift_card();
        scheduler.end_exclusive_gesture(session.freeze);
        scheduler.render_full(state, view);
        info!("event=drag_cancel module=drag task_id={}", session.task_id);
        Some(DragOutcome::Cancelled)
    }
}
