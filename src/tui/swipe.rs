use std::time::{Duration, Instant};

use log::{debug, info};

use crate::model::task::SubtaskKey;

use super::geometry::Point;
use super::list_view::ListView;

/// Horizontal travel needed before a touch locks into a swipe
pub const LOCK_DX: f32 = 8.0;
/// Vertical travel at or beyond which a touch is treated as a scroll
pub const REJECT_DY: f32 = 10.0;
/// Visual offset is clamped to ±this
pub const MAX_OFFSET: f32 = 110.0;
/// Release distance that commits an action
pub const COMMIT_DX: f32 = 80.0;
/// Duration of the snap-back animation
pub const REVERT_DURATION: Duration = Duration::from_millis(180);

/// Action produced by a committed swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAction {
    /// Left swipe: ask the confirmation collaborator before deleting
    DeleteRequested(SubtaskKey),
    /// Right swipe: start or stop this subtask's timer
    ToggleTimer(SubtaskKey),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Tracking {
        key: SubtaskKey,
        start: Point,
    },
    /// Vertical movement won; moves are ignored until the touch ends
    Rejected {
        key: SubtaskKey,
    },
    HorizontalLocked {
        key: SubtaskKey,
        start: Point,
        dx: f32,
        /// A new offset awaits the next frame
        dirty: bool,
    },
    Reverting {
        key: SubtaskKey,
        from: f32,
        started: Instant,
    },
}

/// Per-row swipe state machine.
///
/// `Idle → Tracking → {HorizontalLocked | Rejected} → {commit | Reverting} → Idle`.
/// Offsets are written to the view at most once per frame, from
/// `on_frame`. Every lookup goes through the view by key, so a row removed
/// by a full render simply ends the gesture.
#[derive(Debug, Clone)]
pub struct SwipeController {
    phase: Phase,
}

impl Default for SwipeController {
    fn default() -> Self {
        SwipeController { phase: Phase::Idle }
    }
}

impl SwipeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// A touch is down on a row (tracking, locked, or rejected)
    pub fn is_pressed(&self) -> bool {
        matches!(
            self.phase,
            Phase::Tracking { .. } | Phase::Rejected { .. } | Phase::HorizontalLocked { .. }
        )
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.phase, Phase::HorizontalLocked { .. })
    }

    pub fn is_reverting(&self) -> bool {
        matches!(self.phase, Phase::Reverting { .. })
    }

    /// Row the current gesture belongs to
    pub fn key(&self) -> Option<SubtaskKey> {
        match self.phase {
            Phase::Idle => None,
            Phase::Tracking { key, .. }
            | Phase::Rejected { key }
            | Phase::HorizontalLocked { key, .. }
            | Phase::Reverting { key, .. } => Some(key),
        }
    }

    /// Current locked displacement, clamped
    pub fn dx(&self) -> Option<f32> {
        match self.phase {
            Phase::HorizontalLocked { dx, .. } => Some(dx),
            _ => None,
        }
    }

    /// Snap a row that is still animating home straight to rest
    pub fn finish_revert(&mut self, view: &mut ListView) {
        if let Phase::Reverting { key, .. } = self.phase {
            self.settle(key, view);
        }
    }

    /// A touch begins on `key`'s foreground. A revert still animating is
    /// finished on the spot. Returns false if the row is not displayed.
    pub fn touch_start(&mut self, key: SubtaskKey, at: Point, view: &mut ListView) -> bool {
        self.finish_revert(view);
        if !self.is_idle() {
            return false;
        }
        if !view.pin_row_height(key) {
            return false;
        }
        self.phase = Phase::Tracking { key, start: at };
        true
    }

    /// A move sample. While tracking, a sample decides the gesture only once
    /// it crosses a threshold; smaller samples keep tracking. A rejected
    /// touch gives its row back straight away.
    pub fn touch_move(&mut self, at: Point, view: &mut ListView) {
        match self.phase {
            Phase::Tracking { key, start } => {
                let dx = at.x - start.x;
                let dy = at.y - start.y;
                if dy.abs() >= REJECT_DY {
                    debug!("event=swipe_rejected module=swipe key={} dy={}", key, dy);
                    view.unpin_row_height(key);
                    self.phase = Phase::Rejected { key };
                } else if dx.abs() > LOCK_DX {
                    self.phase = Phase::HorizontalLocked {
                        key,
                        start,
                        dx: dx.clamp(-MAX_OFFSET, MAX_OFFSET),
                        dirty: true,
                    };
                }
            }
            Phase::HorizontalLocked {
                start,
                ref mut dx,
                ref mut dirty,
                ..
            } => {
                *dx = (at.x - start.x).clamp(-MAX_OFFSET, MAX_OFFSET);
                *dirty = true;
            }
            _ => {}
        }
    }

    /// The touch ends. The last sample's displacement decides: at or past
    /// `COMMIT_DX` either way commits, anything short reverts.
    pub fn touch_end(&mut self, view: &mut ListView, now: Instant) -> Option<SwipeAction> {
        match self.phase {
            Phase::HorizontalLocked { key, dx, .. } => {
                let action = if dx <= -COMMIT_DX {
                    Some(SwipeAction::DeleteRequested(key))
                } else if dx >= COMMIT_DX {
                    Some(SwipeAction::ToggleTimer(key))
                } else {
                    None
                };
                match action {
                    Some(action) => {
                        info!(
                            "event=swipe_commit module=swipe key={} dx={} action={:?}",
                            key, dx, action
                        );
                        self.settle(key, view);
                    }
                    None => self.begin_revert(key, dx, now),
                }
                action
            }
            Phase::Tracking { key, .. } | Phase::Rejected { key } => {
                self.settle(key, view);
                None
            }
            Phase::Idle | Phase::Reverting { .. } => None,
        }
    }

    /// The touch was cancelled. A locked swipe animates back without acting.
    pub fn touch_cancel(&mut self, view: &mut ListView, now: Instant) {
        match self.phase {
            Phase::HorizontalLocked { key, dx, .. } => {
                debug!("event=swipe_cancel module=swipe key={}", key);
                self.begin_revert(key, dx, now);
            }
            Phase::Tracking { key, .. } | Phase::Rejected { key } => self.settle(key, view),
            Phase::Idle | Phase::Reverting { .. } => {}
        }
    }

    /// Per-frame work: flush a pending offset or advance the revert.
    pub fn on_frame(&mut self, view: &mut ListView, now: Instant) {
        match self.phase {
            Phase::HorizontalLocked {
                key,
                dx,
                ref mut dirty,
                ..
            } => {
                if *dirty {
                    *dirty = false;
                    if !view.set_row_offset(key, dx) {
                        self.phase = Phase::Idle;
                    }
                }
            }
            Phase::Reverting { key, from, started } => {
                let t = now.saturating_duration_since(started).as_secs_f32()
                    / REVERT_DURATION.as_secs_f32();
                if t >= 1.0 {
                    self.settle(key, view);
                } else {
                    // Ease out: fast at first, slowing into place
                    let remaining = (1.0 - t) * (1.0 - t);
                    if !view.set_row_offset(key, from * remaining) {
                        self.phase = Phase::Idle;
                    }
                }
            }
            _ => {}
        }
    }

    fn begin_revert(&mut self, key: SubtaskKey, from: f32, now: Instant) {
        self.phase = Phase::Reverting {
            key,
            from,
            started: now,
        };
    }

    /// Zero the offset, release the pinned height, go idle
    fn settle(&mut self, key: SubtaskKey, view: &mut ListView) {
        view.set_row_offset(key, 0.0);
        view.unpin_row_height(key);
        self.phase = Phase::Idle;
    }
}
