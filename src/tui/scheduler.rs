use log::debug;

use crate::ops::state_store::AppState;
use crate::util::time_fmt::format_elapsed;

use super::list_view::ListView;

/// Proof of holding the render freeze.
///
/// Only `RenderScheduler::begin_exclusive_gesture` creates one and only
/// `end_exclusive_gesture` consumes it. It cannot be cloned, so there is
/// exactly one holder at a time.
#[derive(Debug)]
#[must_use = "dropping the token without ending the gesture leaves rendering frozen"]
pub struct ExclusiveGesture {
    _private: (),
}

/// Counters of renders that actually ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub full: u64,
    pub incremental: u64,
    /// Rows whose time text an incremental render replaced
    pub patched_rows: u64,
}

/// Single choke point for visual updates of the list.
///
/// While an exclusive gesture holds the freeze, both render paths return
/// without touching the view.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    frozen: bool,
    stats: RenderStats,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze rendering for a structural gesture. None if another gesture
    /// already holds the freeze.
    pub fn begin_exclusive_gesture(&mut self) -> Option<ExclusiveGesture> {
        if self.frozen {
            return None;
        }
        self.frozen = true;
        debug!("event=render_freeze module=render");
        Some(ExclusiveGesture { _private: () })
    }

    pub fn end_exclusive_gesture(&mut self, token: ExclusiveGesture) {
        let ExclusiveGesture { _private: () } = token;
        self.frozen = false;
        debug!("event=render_thaw module=render");
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Rebuild the whole list from the store. Call once after each
    /// structural change, never from the frame loop. Returns whether it ran.
    pub fn render_full(&mut self, state: &AppState, view: &mut ListView) -> bool {
        if self.frozen {
            return false;
        }
        view.rebuild(state);
        self.stats.full += 1;
        true
    }

    /// Refresh the time text of displayed rows in place. Structure, row
    /// offsets and scroll are untouched; rows missing from the store are
    /// skipped. Returns whether it ran.
    pub fn render_incremental(&mut self, state: &AppState, view: &mut ListView) -> bool {
        if self.frozen {
            return false;
        }
        let stale: Vec<_> = view
            .rows()
            .filter_map(|row| {
                let st = state.subtask(row.key)?;
                let text = format_elapsed(st.elapsed_ms);
                (text != row.time_text).then_some((row.key, text))
            })
            .collect();
        for (key, text) in stale {
            if view.patch_time(key, &text) {
                self.stats.patched_rows += 1;
            }
        }
        self.stats.incremental += 1;
        true
    }
}
