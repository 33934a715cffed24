use std::time::Instant;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::kv_store::MemoryStore;
use crate::model::UiConfig;
use crate::model::task::Task;
use crate::ops::state_store::AppState;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Two cards, "One" with subtask "a" and "Two" with subtask "b", light mode,
/// backed by an in-memory store.
pub fn two_card_app() -> App {
    let state = AppState::new(vec![
        Task::new(1, "One").with_subtask(1, "a"),
        Task::new(2, "Two").with_subtask(1, "b"),
    ]);
    App::new(
        state,
        Box::new(MemoryStore::new()),
        &UiConfig::default(),
        Instant::now(),
    )
}
