use std::time::{Duration, Instant};

use crate::io::kv_store::KeyValueStore;
use crate::io::persist;
use crate::ops::state_store::{AppState, TickOutcome};

use super::list_view::ListView;
use super::scheduler::RenderScheduler;

/// Per-frame elapsed-time driver.
///
/// Each tick recomputes the running subtask from the timer's start instant,
/// persists, and pushes an incremental render. It never issues a full
/// render, so in-flight gesture visuals survive every tick.
#[derive(Debug, Clone)]
pub struct TimerLoop {
    interval: Duration,
    next_frame: Instant,
    ticks: u64,
}

impl TimerLoop {
    pub fn new(interval: Duration, now: Instant) -> Self {
        TimerLoop {
            interval: interval.max(Duration::from_millis(1)),
            next_frame: now,
            ticks: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_frame
    }

    /// Time left before the next frame; zero when one is already due
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next_frame.saturating_duration_since(now)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one frame and re-arm for the next.
    pub fn tick(
        &mut self,
        now: Instant,
        state: &mut AppState,
        scheduler: &mut RenderScheduler,
        view: &mut ListView,
        store: &mut dyn KeyValueStore,
    ) -> TickOutcome {
        self.next_frame = now + self.interval;
        self.ticks += 1;

        let outcome = state.tick(now);
        if let TickOutcome::Advanced { .. } = outcome {
            persist::save_tasks(store, state);
            scheduler.render_incremental(state, view);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv_store::MemoryStore;
    use crate::io::persist::TASKS_KEY;
    use crate::model::task::{SubtaskKey, Task};
    use crate::tui::geometry::CellMetrics;

    struct Rig {
        state: AppState,
        view: ListView,
        scheduler: RenderScheduler,
        store: MemoryStore,
        timer: TimerLoop,
        t0: Instant,
    }

    fn rig() -> Rig {
        let state = AppState::new(vec![
            Task::new(1, "One").with_subtask(1, "a"),
            Task::new(2, "Two").with_subtask(1, "b"),
        ]);
        let mut view = ListView::new(CellMetrics::default());
        let mut scheduler = RenderScheduler::new();
        scheduler.render_full(&state, &mut view);
        let t0 = Instant::now();
        Rig {
            state,
            view,
            scheduler,
            store: MemoryStore::new(),
            timer: TimerLoop::new(Duration::from_millis(16), t0),
            t0,
        }
    }

    impl Rig {
        fn frame(&mut self, at: Duration) -> TickOutcome {
            self.timer.tick(
                self.t0 + at,
                &mut self.state,
                &mut self.scheduler,
                &mut self.view,
                &mut self.store,
            )
        }
    }

    #[test]
    fn idle_ticks_do_nothing() {
        let mut r = rig();
        assert_eq!(r.frame(Duration::from_millis(16)), TickOutcome::Idle);
        assert_eq!(r.store.write_count(TASKS_KEY), 0);
        assert_eq!(r.scheduler.stats().incremental, 0);
    }

    #[test]
    fn running_timer_persists_and_patches_each_tick() {
        let mut r = rig();
        let key = SubtaskKey::new(2, 1);
        r.state.toggle_timer(key, r.t0);
        for i in 1..=3 {
            r.frame(Duration::from_millis(16 * i));
        }
        assert_eq!(r.store.write_count(TASKS_KEY), 3);
        assert_eq!(r.scheduler.stats().incremental, 3);
        assert_eq!(r.scheduler.stats().full, 1);
    }

    #[test]
    fn frozen_scheduler_still_advances_store() {
        let mut r = rig();
        let key = SubtaskKey::new(1, 1);
        r.state.toggle_timer(key, r.t0);
        let token = r.scheduler.begin_exclusive_gesture().unwrap();

        r.frame(Duration::from_millis(2_000));
        assert_eq!(r.state.subtask(key).unwrap().elapsed_ms, 2_000);
        assert_eq!(r.view.row(key).unwrap().time_text, "00:00");
        assert_eq!(r.store.write_count(TASKS_KEY), 1);

        r.scheduler.end_exclusive_gesture(token);
        r.frame(Duration::from_millis(2_016));
        assert_eq!(r.view.row(key).unwrap().time_text, "00:02");
    }

    #[test]
    fn scheduling_rearms_one_interval_after_each_tick() {
        let mut r = rig();
        let now = r.t0 + Duration::from_millis(5);
        assert!(r.timer.is_due(now));
        r.frame(Duration::from_millis(5));
        assert!(!r.timer.is_due(now + Duration::from_millis(10)));
        assert_eq!(
            r.timer.time_until_next(now + Duration::from_millis(10)),
            Duration::from_millis(6)
        );
        assert!(r.timer.is_due(now + Duration::from_millis(16)));
        assert_eq!(r.timer.ticks(), 1);
    }
}
