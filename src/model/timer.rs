use std::time::Instant;

use super::task::SubtaskKey;

/// The single subtask currently accumulating time.
///
/// While active, the subtask's elapsed time is always
/// `base_elapsed_ms + (now - started_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTimer {
    pub key: SubtaskKey,
    pub started_at: Instant,
    pub base_elapsed_ms: u64,
}

impl ActiveTimer {
    pub fn start(key: SubtaskKey, base_elapsed_ms: u64, now: Instant) -> Self {
        ActiveTimer {
            key,
            started_at: now,
            base_elapsed_ms,
        }
    }

    /// Elapsed time of the timed subtask at `now`. Clocks that appear to run
    /// backwards contribute nothing rather than underflowing.
    pub fn elapsed_at(&self, now: Instant) -> u64 {
        let running = now.saturating_duration_since(self.started_at).as_millis();
        self.base_elapsed_ms
            .saturating_add(u64::try_from(running).unwrap_or(u64::MAX))
    }
}
